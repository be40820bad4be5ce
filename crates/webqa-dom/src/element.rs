//! The flattened, LLM- and Action-Handler-facing view of a crawl: short
//! external ids mapped to element descriptors, rebuilt on every crawl.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::tree::{DomTree, DomTreeNode};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct ElementFlags {
    pub visible: bool,
    pub interactive: bool,
    pub top_element: bool,
    pub in_viewport: bool,
}

/// One interactive (or otherwise addressable) element surfaced by a crawl.
/// `id` is the short external identifier handed to the LLM/Action Handler
/// ("1", "2", ...); `internal_id` is the long numeric id the page itself
/// assigned, kept for round-tripping back into `DomTreeNode::id`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DomElement {
    pub id: String,
    pub internal_id: Option<i64>,
    pub tag: Option<String>,
    pub class: Option<String>,
    pub inner_text: String,
    pub element_type: Option<String>,
    pub placeholder: Option<String>,
    pub attributes: HashMap<String, String>,
    pub selector: Option<String>,
    pub xpath: Option<String>,
    pub bounding_box: BoundingBox,
    pub center_x: Option<f64>,
    pub center_y: Option<f64>,
    pub flags: ElementFlags,
    pub depth: u32,
    pub parent: Option<String>,
    pub children: Vec<String>,
}

impl DomElement {
    /// Invariant: the element must carry at least one usable locator.
    pub fn has_usable_locator(&self) -> bool {
        self.selector
            .as_deref()
            .map(crate::tree::is_syntactically_valid_css_selector)
            .unwrap_or(false)
            || self.xpath.as_deref().is_some_and(|x| !x.is_empty())
    }
}

/// `map<external_id, DomElement>`. Rewritten wholesale on every crawl;
/// consumed by the Action Handler within the same planning turn. Never
/// durable across navigations.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ElementBuffer {
    elements: HashMap<String, DomElement>,
    next_external_id: u64,
}

impl ElementBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, external_id: &str) -> Option<&DomElement> {
        self.elements.get(external_id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DomElement)> {
        self.elements.iter()
    }

    /// Direct insertion, used by callers that assemble a buffer from a
    /// source other than a live crawl (tests, replay of a recorded
    /// crawl payload).
    pub fn insert(&mut self, external_id: impl Into<String>, element: DomElement) {
        self.elements.insert(external_id.into(), element);
    }

    /// Flattens a `DomTree` into a fresh `ElementBuffer`, assigning short
    /// external ids deterministically in pre-order traversal order. Only
    /// elements the crawl marked interactive are given an id, matching the
    /// source crawler's highlightIndex assignment pass.
    pub fn from_tree(tree: &DomTree) -> Self {
        let mut buffer = ElementBuffer::new();
        let index_to_external: HashMap<usize, String> = tree
            .pre_iter()
            .into_iter()
            .filter(|&idx| tree.nodes[idx].is_interactive.unwrap_or(false))
            .enumerate()
            .map(|(n, idx)| (idx, (n + 1).to_string()))
            .collect();

        for (&node_idx, external_id) in &index_to_external {
            let node = &tree.nodes[node_idx];
            buffer.elements.insert(
                external_id.clone(),
                DomElement {
                    id: external_id.clone(),
                    internal_id: node.id,
                    tag: node.tag.clone(),
                    class: node.class_name.clone(),
                    inner_text: node.inner_text.clone(),
                    element_type: node.element_type.clone(),
                    placeholder: node.placeholder.clone(),
                    attributes: node.attributes.clone(),
                    selector: node.selector.clone(),
                    xpath: node.xpath.clone(),
                    bounding_box: bounding_box_of(node),
                    center_x: node.center_x,
                    center_y: node.center_y,
                    flags: ElementFlags {
                        visible: node.is_visible.unwrap_or(false),
                        interactive: node.is_interactive.unwrap_or(false),
                        top_element: node.is_top_element.unwrap_or(false),
                        in_viewport: node.is_in_viewport.unwrap_or(false),
                    },
                    depth: node.depth,
                    parent: node.parent.and_then(|p| index_to_external.get(&p).cloned()),
                    children: node
                        .children
                        .iter()
                        .filter_map(|c| index_to_external.get(c).cloned())
                        .collect(),
                },
            );
        }
        buffer.next_external_id = index_to_external.len() as u64 + 1;
        buffer
    }
}

fn bounding_box_of(node: &DomTreeNode) -> BoundingBox {
    BoundingBox {
        x: node.viewport.get("x").copied().unwrap_or(0.0),
        y: node.viewport.get("y").copied().unwrap_or(0.0),
        w: node.viewport.get("w").copied().unwrap_or(0.0),
        h: node.viewport.get("h").copied().unwrap_or(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_interactive_nodes_receive_external_ids() {
        let payload = json!({
            "node": {"id": 1, "tagName": "DIV", "attributes": [], "isInteractive": false, "innerText": ""},
            "children": [
                {"node": {"id": 2, "tagName": "BUTTON", "attributes": [], "isInteractive": true, "innerText": "Go"}, "children": []}
            ]
        });
        let tree = DomTree::build_root(&payload).unwrap();
        let buffer = ElementBuffer::from_tree(&tree);
        assert_eq!(buffer.len(), 1);
        let el = buffer.get("1").unwrap();
        assert_eq!(el.tag.as_deref(), Some("button"));
    }
}
