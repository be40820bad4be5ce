//! Action Handler.

mod dropdown;
mod errors;
mod handler;
mod scroll;

pub use dropdown::{match_priority, select_by_text, DropdownSelection, SelectableOption, SelectableQuery};
pub use errors::ActionError;
pub use handler::ActionHandler;
pub use scroll::{scroll, Direction, ScrollType};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use webqa_browser::test_support::MockLauncher;
    use webqa_browser::BrowserSession;
    use webqa_dom::{BoundingBox, DomElement, ElementBuffer, ElementFlags};
    use webqa_session::BrowserConfig;

    use super::*;

    async fn handler_with_element(id: &str, center: (f64, f64)) -> ActionHandler {
        let session = Arc::new(BrowserSession::new(BrowserConfig::default()));
        session.initialize(&MockLauncher).await.unwrap();
        let mut handler = ActionHandler::new(session);
        let mut buffer = ElementBuffer::new();
        buffer.insert(
            id,
            DomElement {
                id: id.to_string(),
                internal_id: Some(1),
                tag: Some("button".to_string()),
                class: None,
                inner_text: "Go".to_string(),
                element_type: None,
                placeholder: None,
                attributes: Default::default(),
                selector: Some("#go".to_string()),
                xpath: Some("/html/body/button".to_string()),
                bounding_box: BoundingBox::default(),
                center_x: Some(center.0),
                center_y: Some(center.1),
                flags: ElementFlags::default(),
                depth: 1,
                parent: None,
                children: vec![],
            },
        );
        handler.set_element_buffer(buffer);
        handler
    }

    #[tokio::test]
    async fn click_returns_false_for_unknown_id() {
        let handler = handler_with_element("1", (10.0, 10.0)).await;
        assert!(!handler.click("missing").await);
    }

    #[tokio::test]
    async fn click_succeeds_for_known_id() {
        let handler = handler_with_element("1", (10.0, 10.0)).await;
        assert!(handler.click("1").await);
    }

    #[tokio::test]
    async fn upload_file_with_no_paths_returns_false() {
        let handler = handler_with_element("1", (10.0, 10.0)).await;
        assert!(!handler.upload_file(&[]).await);
    }

    #[tokio::test]
    async fn clear_on_known_element_returns_true() {
        let handler = handler_with_element("1", (10.0, 10.0)).await;
        assert!(handler.clear("1").await);
    }
}
