//! Action Executor.

mod executor;
mod validate;

pub use executor::{ActionExecutor, ExecutionOutcome};
pub use validate::validate_params;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use webqa_browser::test_support::MockLauncher;
    use webqa_browser::BrowserSession;
    use webqa_dom::{BoundingBox, DomElement, ElementBuffer, ElementFlags};
    use webqa_session::BrowserConfig;

    use super::*;
    use webqa_actions::ActionHandler;

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
    async fn tap_without_locate_fails_validation() {
        let handler = handler_with_element("1", (10.0, 10.0)).await;
        let executor = ActionExecutor::new(&handler);
        let outcome = executor.execute(&json!({"type": "Tap"})).await;
        assert!(!outcome.success);
    }

    #[tokio::test]
    async fn tap_with_known_id_succeeds() {
        let handler = handler_with_element("1", (10.0, 10.0)).await;
        let executor = ActionExecutor::new(&handler);
        let outcome = executor
            .execute(&json!({"type": "Tap", "locate": {"id": "1"}}))
            .await;
        assert!(outcome.success);
    }

    #[tokio::test]
    async fn unknown_action_type_fails_without_panicking() {
        let handler = handler_with_element("1", (10.0, 10.0)).await;
        let executor = ActionExecutor::new(&handler);
        let outcome = executor.execute(&json!({"type": "Teleport"})).await;
        assert!(!outcome.success);
        assert!(outcome.message.contains("Unknown action type"));
    }

    #[tokio::test]
    async fn sleep_action_waits_and_succeeds() {
        let handler = handler_with_element("1", (10.0, 10.0)).await;
        let executor = ActionExecutor::new(&handler);
        let outcome = executor
            .execute(&json!({"type": "Sleep", "param": {"timeMs": 5}}))
            .await;
        assert!(outcome.success);
    }

    #[tokio::test]
    async fn scroll_defaults_distance_when_absent() {
        let handler = handler_with_element("1", (10.0, 10.0)).await;
        let executor = ActionExecutor::new(&handler);
        let outcome = executor
            .execute(&json!({"type": "Scroll", "param": {"direction": "down", "scrollType": "once"}}))
            .await;
        assert!(outcome.success);
    }

    #[tokio::test]
    async fn drag_requires_both_coordinate_pairs() {
        let handler = handler_with_element("1", (10.0, 10.0)).await;
        let executor = ActionExecutor::new(&handler);
        let outcome = executor
            .execute(&json!({"type": "Drag", "param": {"sourceCoordinates": {"x": 1.0, "y": 2.0}}}))
            .await;
        assert!(!outcome.success);
    }
}
