//! A `DomCrawler` backed by a live `BrowserCapability` page-evaluate
//!. The walk itself is page-side JavaScript (`CRAWL_SCRIPT`),
//! split into a page-side walk and a host-side tree build: the browser
//! does the DOM walk and highlight-index assignment, this adapter turns
//! the resulting JSON into the typed `DomTree`/`ElementBuffer` pair.

use async_trait::async_trait;
use webqa_browser::BrowserSession;

use crate::crawler::{render_text_summary, CrawlOutcome, DomCrawler};
use crate::element::ElementBuffer;
use crate::errors::CrawlerError;
use crate::tree::DomTree;

/// Walks `document.body`, skipping `script`/`style`/`noscript`, and
/// returns the nested `{node, children}` shape `DomTree::build_root`
/// expects. Interactive elements (native form controls, anchors,
/// `role=button|link|...`, elements with a click handler attribute, or a
/// non-negative `tabindex`) get a `highlightIndex` in traversal order.
/// When `highlight` is set, a numbered overlay `<div>` is appended to
/// `document.body` for each interactive element and tagged with
/// `data-webqa-marker` so `remove_marker` can find it again.
const CRAWL_SCRIPT_TEMPLATE: &str = r#"(() => {
  const HIGHLIGHT = __HIGHLIGHT__;
  const HIGHLIGHT_TEXT = __HIGHLIGHT_TEXT__;
  const VIEWPORT_ONLY = __VIEWPORT_ONLY__;
  const INTERACTIVE_TAGS = new Set(['a', 'button', 'input', 'select', 'textarea', 'summary']);
  const INTERACTIVE_ROLES = new Set(['button', 'link', 'checkbox', 'radio', 'tab', 'menuitem', 'switch', 'combobox', 'listbox']);
  let counter = 0;
  let highlightIndex = 0;

  function cssSelector(el) {
    if (el.id) return '#' + el.id;
    const parts = [];
    let node = el;
    while (node && node.nodeType === 1 && parts.length < 5) {
      let part = node.tagName.toLowerCase();
      if (node.className && typeof node.className === 'string') {
        part += '.' + node.className.trim().split(/\s+/).join('.');
      }
      parts.unshift(part);
      node = node.parentElement;
    }
    return parts.join(' > ');
  }

  function xpathOf(el) {
    if (el.id) return '//*[@id="' + el.id + '"]';
    const parts = [];
    let node = el;
    while (node && node.nodeType === 1) {
      let idx = 1;
      let sibling = node.previousElementSibling;
      while (sibling) {
        if (sibling.tagName === node.tagName) idx++;
        sibling = sibling.previousElementSibling;
      }
      parts.unshift(node.tagName.toLowerCase() + '[' + idx + ']');
      node = node.parentElement;
    }
    return '/' + parts.join('/');
  }

  function isInteractive(el) {
    const tag = el.tagName.toLowerCase();
    if (INTERACTIVE_TAGS.has(tag)) return true;
    const role = el.getAttribute('role');
    if (role && INTERACTIVE_ROLES.has(role.toLowerCase())) return true;
    const tabindex = el.getAttribute('tabindex');
    if (tabindex !== null && Number(tabindex) >= 0) return true;
    if (el.onclick) return true;
    return false;
  }

  function visitNode(el, depth) {
    const rect = el.getBoundingClientRect();
    const isVisible = rect.width > 0 && rect.height > 0 &&
      getComputedStyle(el).visibility !== 'hidden' && getComputedStyle(el).display !== 'none';
    const inViewport = rect.top < window.innerHeight && rect.bottom > 0 &&
      rect.left < window.innerWidth && rect.right > 0;
    if (VIEWPORT_ONLY && !inViewport) return null;

    const interactive = isVisible && isInteractive(el);
    const attributes = [];
    for (const attr of el.attributes) {
      attributes.push({name: attr.name, value: attr.value});
    }

    let ownText = '';
    for (const child of el.childNodes) {
      if (child.nodeType === 3) ownText += child.textContent;
    }
    const innerText = (ownText || el.innerText || '').trim().slice(0, 500);

    const node = {
      id: counter++,
      highlightIndex: interactive ? highlightIndex : null,
      tagName: el.tagName,
      className: typeof el.className === 'string' ? el.className : null,
      innerText: innerText,
      type: el.getAttribute('type'),
      placeholder: el.getAttribute('placeholder'),
      attributes: attributes,
      selector: cssSelector(el),
      xpath: xpathOf(el),
      viewport: {x: rect.left, y: rect.top, w: rect.width, h: rect.height},
      center_x: rect.left + rect.width / 2,
      center_y: rect.top + rect.height / 2,
      isVisible: isVisible,
      isInteractive: interactive,
      isTopElement: document.elementFromPoint(rect.left + rect.width / 2, rect.top + rect.height / 2) === el,
      isInViewport: inViewport,
    };

    if (interactive) {
      if (HIGHLIGHT) {
        const marker = document.createElement('div');
        marker.setAttribute('data-webqa-marker', 'true');
        marker.style.cssText = 'position:fixed;z-index:2147483647;pointer-events:none;' +
          'left:' + rect.left + 'px;top:' + rect.top + 'px;width:' + rect.width + 'px;height:' + rect.height + 'px;' +
          'outline:2px solid #f00;';
        if (HIGHLIGHT_TEXT) {
          const label = document.createElement('span');
          label.textContent = String(highlightIndex);
          label.style.cssText = 'position:absolute;top:-14px;left:0;background:#f00;color:#fff;font-size:10px;padding:0 2px;';
          marker.appendChild(label);
        }
        document.body.appendChild(marker);
      }
      highlightIndex++;
    }

    const children = [];
    for (const child of el.children) {
      const childResult = visitNode(child, depth + 1);
      if (childResult) children.push(childResult);
    }
    return {node: node, children: children};
  }

  const skip = new Set(['SCRIPT', 'STYLE', 'NOSCRIPT']);
  const root = document.body;
  if (skip.has(root.tagName)) return {node: null, children: []};
  return visitNode(root, 0);
})()"#;

fn render_script(highlight: bool, highlight_text: bool, viewport_only: bool) -> String {
    CRAWL_SCRIPT_TEMPLATE
        .replace("__HIGHLIGHT__", &highlight.to_string())
        .replace("__HIGHLIGHT_TEXT__", &highlight_text.to_string())
        .replace("__VIEWPORT_ONLY__", &viewport_only.to_string())
}

const REMOVE_MARKER_SCRIPT: &str =
    r#"document.querySelectorAll('[data-webqa-marker]').forEach(n => n.remove());"#;

pub struct BrowserDomCrawler {
    session: std::sync::Arc<BrowserSession>,
}

impl BrowserDomCrawler {
    pub fn new(session: std::sync::Arc<BrowserSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl DomCrawler for BrowserDomCrawler {
    async fn crawl(
        &self,
        highlight: bool,
        highlight_text: bool,
        viewport_only: bool,
    ) -> Result<CrawlOutcome, CrawlerError> {
        let capability = self
            .session
            .capability()
            .await
            .map_err(|e| CrawlerError::Evaluate(e.to_string()))?;
        let script = render_script(highlight, highlight_text, viewport_only);
        let payload = capability
            .evaluate(&script)
            .await
            .map_err(CrawlerError::Evaluate)?;
        let tree = DomTree::build_root(&payload)?;
        let elements = ElementBuffer::from_tree(&tree);
        Ok(CrawlOutcome { tree, elements })
    }

    fn get_text(&self, outcome: &CrawlOutcome) -> String {
        render_text_summary(outcome)
    }

    async fn remove_marker(&self) -> Result<(), CrawlerError> {
        let capability = self
            .session
            .capability()
            .await
            .map_err(|e| CrawlerError::Evaluate(e.to_string()))?;
        capability
            .evaluate(REMOVE_MARKER_SCRIPT)
            .await
            .map_err(CrawlerError::Evaluate)?;
        Ok(())
    }
}
