//! Arena-backed DOM tree, built from the raw nested JSON produced by a
//! page-side crawl evaluate. Parent/child links are indices into the
//! arena's `Vec`, never `Rc`, so there are no ownership cycles.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::CrawlerError;

pub type NodeIndex = usize;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DomTreeNode {
    pub id: Option<i64>,
    pub highlight_index: Option<i64>,
    pub tag: Option<String>,
    pub class_name: Option<String>,
    pub inner_text: String,
    pub element_type: Option<String>,
    pub placeholder: Option<String>,
    pub attributes: HashMap<String, String>,
    pub selector: Option<String>,
    pub xpath: Option<String>,
    pub viewport: HashMap<String, f64>,
    pub center_x: Option<f64>,
    pub center_y: Option<f64>,
    pub is_visible: Option<bool>,
    pub is_interactive: Option<bool>,
    pub is_top_element: Option<bool>,
    pub is_in_viewport: Option<bool>,
    pub subtree: Value,
    pub depth: u32,
    pub parent: Option<NodeIndex>,
    pub children: Vec<NodeIndex>,
}

/// A built DOM tree. `nodes[root]` is the root; every other node is
/// reachable from it via `children`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DomTree {
    pub nodes: Vec<DomTreeNode>,
    pub root: NodeIndex,
}

impl DomTree {
    pub fn root(&self) -> &DomTreeNode {
        &self.nodes[self.root]
    }

    /// Pre-order traversal (root first, then children in order), mirroring
    /// a pre-order traversal.
    pub fn pre_iter(&self) -> Vec<NodeIndex> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            out.push(idx);
            for &child in self.nodes[idx].children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Post-order traversal (children before their parent).
    pub fn post_iter(&self) -> Vec<NodeIndex> {
        let mut out = Vec::with_capacity(self.nodes.len());
        fn visit(tree: &DomTree, idx: NodeIndex, out: &mut Vec<NodeIndex>) {
            for &child in &tree.nodes[idx].children {
                visit(tree, child, out);
            }
            out.push(idx);
        }
        visit(self, self.root, &mut out);
        out
    }

    /// Node count at each depth level, for crawl diagnostics.
    pub fn count_depth(&self) -> HashMap<u32, usize> {
        let mut counts = HashMap::new();
        for idx in self.pre_iter() {
            *counts.entry(self.nodes[idx].depth).or_insert(0) += 1;
        }
        counts
    }

    pub fn find_by_tag(&self, tag_name: &str) -> Vec<NodeIndex> {
        self.pre_iter()
            .into_iter()
            .filter(|&idx| self.nodes[idx].tag.as_deref() == Some(tag_name))
            .collect()
    }

    pub fn find_by_id(&self, target_id: i64) -> Option<NodeIndex> {
        self.pre_iter()
            .into_iter()
            .find(|&idx| self.nodes[idx].id == Some(target_id))
    }

    /// Builds a tree from the raw nested `{node, children, subtree}` payload
    /// a crawl evaluate returns. When the payload has no single root node
    /// (a multi-root fragment), wraps it in a synthetic `__root__` node,
    /// so callers always have a single root to traverse from.
    pub fn build_root(data: &Value) -> Result<DomTree, CrawlerError> {
        let wrapped;
        let data = if data.get("node").map(Value::is_null).unwrap_or(true) {
            wrapped = synthetic_root_wrap(data.clone());
            &wrapped
        } else {
            data
        };

        let mut nodes = Vec::new();
        let roots = build_dom_tree(data, None, 0, &mut nodes);
        let root = *roots.first().ok_or(CrawlerError::EmptyPayload)?;
        Ok(DomTree { nodes, root })
    }
}

fn synthetic_root_wrap(data: Value) -> Value {
    serde_json::json!({
        "node": {
            "id": null,
            "highlightIndex": null,
            "tagName": "__root__",
            "className": null,
            "innerText": "",
            "type": null,
            "placeholder": null,
            "attributes": [],
            "selector": null,
            "xpath": null,
            "viewport": {},
            "center_x": null,
            "center_y": null,
            "isVisible": true,
            "isInteractive": false,
            "isTopElement": false,
            "isInViewport": true,
        },
        "children": [data],
        "subtree": [],
    })
}

/// Recursively converts one nested `{node, children, subtree}` dict into
/// arena nodes, returning the indices of the node(s) produced at this
/// level (a node's own index if it has one, else its children's, when
/// `node` is absent and this level is a pass-through).
fn build_dom_tree(
    data: &Value,
    parent: Option<NodeIndex>,
    depth: u32,
    nodes: &mut Vec<DomTreeNode>,
) -> Vec<NodeIndex> {
    let node_data = data.get("node").filter(|v| !v.is_null());
    let empty_children = Vec::new();
    let children_data = data
        .get("children")
        .and_then(Value::as_array)
        .unwrap_or(&empty_children);

    match node_data {
        Some(node_data) => {
            let attributes = node_data
                .get("attributes")
                .and_then(Value::as_array)
                .map(|entries| {
                    entries
                        .iter()
                        .filter_map(|a| {
                            let name = a.get("name")?.as_str()?.to_string();
                            let value = a.get("value").and_then(Value::as_str).unwrap_or("").to_string();
                            Some((name, value))
                        })
                        .collect()
                })
                .unwrap_or_default();

            let viewport = node_data
                .get("viewport")
                .and_then(Value::as_object)
                .map(|m| {
                    m.iter()
                        .filter_map(|(k, v)| v.as_f64().map(|f| (k.clone(), f)))
                        .collect()
                })
                .unwrap_or_default();

            let tag = node_data
                .get("tagName")
                .and_then(Value::as_str)
                .map(|s| s.to_lowercase())
                .filter(|s| !s.is_empty());

            let inner_text = node_data
                .get("innerText")
                .and_then(Value::as_str)
                .unwrap_or("")
                .trim()
                .to_string();

            let node_index = nodes.len();
            nodes.push(DomTreeNode {
                id: node_data.get("id").and_then(Value::as_i64),
                highlight_index: node_data.get("highlightIndex").and_then(Value::as_i64),
                tag,
                class_name: node_data
                    .get("className")
                    .and_then(Value::as_str)
                    .map(String::from),
                inner_text,
                element_type: node_data.get("type").and_then(Value::as_str).map(String::from),
                placeholder: node_data
                    .get("placeholder")
                    .and_then(Value::as_str)
                    .map(String::from),
                attributes,
                selector: node_data.get("selector").and_then(Value::as_str).map(String::from),
                xpath: node_data.get("xpath").and_then(Value::as_str).map(String::from),
                viewport,
                center_x: node_data.get("center_x").and_then(Value::as_f64),
                center_y: node_data.get("center_y").and_then(Value::as_f64),
                is_visible: node_data.get("isVisible").and_then(Value::as_bool),
                is_interactive: node_data.get("isInteractive").and_then(Value::as_bool),
                is_top_element: node_data.get("isTopElement").and_then(Value::as_bool),
                is_in_viewport: node_data.get("isInViewport").and_then(Value::as_bool),
                subtree: data.get("subtree").cloned().unwrap_or(Value::Null),
                depth,
                parent,
                children: Vec::new(),
            });

            for child_data in children_data {
                let child_indices = build_dom_tree(child_data, Some(node_index), depth + 1, nodes);
                for child_index in child_indices {
                    nodes[node_index].children.push(child_index);
                }
            }

            vec![node_index]
        }
        None => {
            let mut out = Vec::new();
            for child_data in children_data {
                out.extend(build_dom_tree(child_data, parent, depth, nodes));
            }
            out
        }
    }
}

/// Syntactic CSS selector validity check: rejects selectors that
/// start with a digit (unless the selector is a pseudo-class), have
/// unmatched brackets/parens, or use characters outside the allowed set.
/// This is NOT a full CSS grammar check — it is the same coarse gate the
/// source crawler applies before handing a selector to the page, so the
/// Action Handler knows to fall through to XPath instead.
pub fn is_syntactically_valid_css_selector(selector: &str) -> bool {
    let selector = selector.trim();
    if selector.is_empty() {
        return false;
    }
    if let Some(first) = selector.chars().next() {
        if first.is_ascii_digit() && !selector.starts_with(':') {
            return false;
        }
    }

    let mut bracket_depth = 0i32;
    let mut paren_depth = 0i32;
    for c in selector.chars() {
        match c {
            '[' => bracket_depth += 1,
            ']' => bracket_depth -= 1,
            '(' => paren_depth += 1,
            ')' => paren_depth -= 1,
            c if c.is_ascii_alphanumeric() => {}
            '.' | '#' | '-' | '_' | ':' | ' ' | '>' | '+' | '~' | '*' | '=' | '"' | '\'' | '^'
            | '$' | '|' | '!' | '\\' => {}
            _ => return false,
        }
        if bracket_depth < 0 || paren_depth < 0 {
            return false;
        }
    }
    bracket_depth == 0 && paren_depth == 0
}
