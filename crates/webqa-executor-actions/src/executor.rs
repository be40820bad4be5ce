//! Action Executor: dispatch table from a planner action's
//! `type` tag to an `ActionHandler` call. Never screenshots (that is
//! the caller's responsibility); returns `{success, message}`
//! uniformly and never raises for an unknown `type`.

use serde::Serialize;
use serde_json::Value;
use webqa_actions::ActionHandler;

use crate::validate::validate_params;

#[derive(Clone, Debug, Serialize)]
pub struct ExecutionOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector_type: Option<String>,
}

impl ExecutionOutcome {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            available_options: None,
            selector_type: None,
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            available_options: None,
            selector_type: None,
        }
    }
}

pub struct ActionExecutor<'a> {
    handler: &'a ActionHandler,
}

impl<'a> ActionExecutor<'a> {
    pub fn new(handler: &'a ActionHandler) -> Self {
        Self { handler }
    }

    /// Executes one planner action (a raw JSON object with `type`,
    /// optional `locate`, optional `param`). Unknown `type` or a
    /// missing `type` tag both return `success: false` without
    /// raising.
    pub async fn execute(&self, action: &Value) -> ExecutionOutcome {
        let Some(action_type) = action.get("type").and_then(Value::as_str) else {
            return ExecutionOutcome::fail("Action type is required");
        };

        tracing::debug!(action_type, "executing action");
        match action_type {
            "Tap" => self.execute_tap(action).await,
            "Hover" => self.execute_hover(action).await,
            "Sleep" => self.execute_sleep(action).await,
            "Input" => self.execute_input(action).await,
            "Clear" => self.execute_clear(action).await,
            "Scroll" => self.execute_scroll(action).await,
            "KeyboardPress" => self.execute_keyboard_press(action).await,
            "FalsyConditionStatement" => ExecutionOutcome::ok("Falsy condition met."),
            "Check" => ExecutionOutcome::ok("Check action completed."),
            "GetNewPage" => self.execute_get_new_page().await,
            "Upload" => self.execute_upload(action).await,
            "SelectDropdown" => self.execute_select_dropdown(action).await,
            "Drag" => self.execute_drag(action).await,
            other => {
                tracing::error!(action_type = other, "unknown action type");
                ExecutionOutcome::fail(format!("Unknown action type: {other}"))
            }
        }
    }

    fn locate_id(action: &Value) -> Option<&str> {
        action.get("locate").and_then(|l| l.get("id")).and_then(Value::as_str)
    }

    async fn execute_tap(&self, action: &Value) -> ExecutionOutcome {
        if !validate_params(action, "Tap", &["locate.id"]) {
            return ExecutionOutcome::fail("Missing locate.id for tap action");
        }
        if self.handler.click(Self::locate_id(action).unwrap()).await {
            ExecutionOutcome::ok("Tap action successful.")
        } else {
            ExecutionOutcome::fail("Tap action failed. The element might not be clickable.")
        }
    }

    async fn execute_hover(&self, action: &Value) -> ExecutionOutcome {
        if !validate_params(action, "Hover", &["locate.id"]) {
            return ExecutionOutcome::fail("Missing locate.id for hover action");
        }
        if self.handler.hover(Self::locate_id(action).unwrap()).await {
            ExecutionOutcome::ok("Hover action successful.")
        } else {
            ExecutionOutcome::fail("Hover action failed. The element might not be hoverable.")
        }
    }

    async fn execute_sleep(&self, action: &Value) -> ExecutionOutcome {
        if !validate_params(action, "Sleep", &["param.timeMs"]) {
            return ExecutionOutcome::fail("Missing param.timeMs for sleep action");
        }
        let time_ms = action
            .get("param")
            .and_then(|p| p.get("timeMs"))
            .and_then(Value::as_u64)
            .unwrap_or(0);
        tokio::time::sleep(std::time::Duration::from_millis(time_ms)).await;
        ExecutionOutcome::ok(format!("Slept for {time_ms}ms."))
    }

    async fn execute_input(&self, action: &Value) -> ExecutionOutcome {
        if !validate_params(action, "Input", &["locate.id", "param.value"]) {
            return ExecutionOutcome::fail("Missing locate.id or param.value for input action");
        }
        let value = action.get("param").and_then(|p| p.get("value")).and_then(Value::as_str).unwrap_or("");
        let clear_before_type = action
            .get("param")
            .and_then(|p| p.get("clear_before_type"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if self
            .handler
            .type_text(Self::locate_id(action).unwrap(), value, clear_before_type)
            .await
        {
            ExecutionOutcome::ok("Input action successful.")
        } else {
            ExecutionOutcome::fail("Input action failed. The element might not be available for typing.")
        }
    }

    async fn execute_clear(&self, action: &Value) -> ExecutionOutcome {
        if !validate_params(action, "Clear", &["locate.id"]) {
            return ExecutionOutcome::fail("Missing locate.id for clear action");
        }
        if self.handler.clear(Self::locate_id(action).unwrap()).await {
            ExecutionOutcome::ok("Clear action successful.")
        } else {
            ExecutionOutcome::fail("Clear action failed. The element might not be clearable.")
        }
    }

    async fn execute_scroll(&self, action: &Value) -> ExecutionOutcome {
        if !validate_params(
            action,
            "Scroll",
            &["param.direction", "param.scrollType", "param.distance"],
        ) {
            return ExecutionOutcome::fail("Missing parameters for scroll action");
        }
        let param = action.get("param");
        let direction = param.and_then(|p| p.get("direction")).and_then(Value::as_str).unwrap_or("down");
        let scroll_type = param.and_then(|p| p.get("scrollType")).and_then(Value::as_str).unwrap_or("once");
        let distance = param.and_then(|p| p.get("distance")).and_then(Value::as_i64);
        if self.handler.scroll(direction, scroll_type, distance).await {
            ExecutionOutcome::ok(format!("Scrolled {direction} successfully."))
        } else {
            ExecutionOutcome::fail("Scroll action failed.")
        }
    }

    async fn execute_keyboard_press(&self, action: &Value) -> ExecutionOutcome {
        if !validate_params(action, "KeyboardPress", &["param.value"]) {
            return ExecutionOutcome::fail("Missing param.value for keyboard press action");
        }
        let key = action.get("param").and_then(|p| p.get("value")).and_then(Value::as_str).unwrap_or("");
        if self.handler.keyboard_press(key).await {
            ExecutionOutcome::ok("Keyboard press successful.")
        } else {
            ExecutionOutcome::fail("Keyboard press failed.")
        }
    }

    async fn execute_get_new_page(&self) -> ExecutionOutcome {
        if self.handler.get_new_page().await {
            ExecutionOutcome::ok("Successfully switched to new page.")
        } else {
            ExecutionOutcome::fail("Failed to get new page.")
        }
    }

    async fn execute_upload(&self, action: &Value) -> ExecutionOutcome {
        if !validate_params(action, "Upload", &["locate.id", "param.file_path"]) {
            return ExecutionOutcome::fail("Missing locate.id or param.file_path for upload action");
        }
        let paths: Vec<String> = match action.get("param").and_then(|p| p.get("file_path")) {
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Array(items)) => items.iter().filter_map(|v| v.as_str().map(String::from)).collect(),
            _ => vec![],
        };
        if self.handler.upload_file(&paths).await {
            ExecutionOutcome::ok("File upload successful.")
        } else {
            ExecutionOutcome::fail("File upload failed.")
        }
    }

    /// SelectDropdown policy: `option_id` + single-entry path ->
    /// direct click; list path -> iterate cascade levels with a 500ms
    /// inter-level pause; otherwise text-match with the handler's
    /// default priority ordering.
    async fn execute_select_dropdown(&self, action: &Value) -> ExecutionOutcome {
        let locate = action.get("locate").cloned().unwrap_or(Value::Null);
        let Some(dropdown_id) = locate.get("dropdown_id").and_then(Value::as_str) else {
            return ExecutionOutcome::fail("dropdown_id and selection_path are required for SelectDropdown");
        };
        let option_id = locate.get("option_id").and_then(Value::as_str);
        let selection_path_param = action.get("param").and_then(|p| p.get("selection_path"));

        let selection_path: Vec<String> = match selection_path_param {
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Array(items)) if !items.is_empty() => {
                items.iter().filter_map(|v| v.as_str().map(String::from)).collect()
            }
            _ => {
                return ExecutionOutcome::fail("selection_path must be a non-empty string or list");
            }
        };

        if let Some(option_id) = option_id {
            if selection_path.len() == 1 {
                let result = self
                    .handler
                    .select_dropdown_option(dropdown_id, &selection_path[0], Some(option_id))
                    .await;
                return ExecutionOutcome {
                    success: result.success,
                    message: result.message,
                    available_options: result.available_options,
                    selector_type: Some(result.selector_type),
                };
            }
        }

        if selection_path.len() == 1 {
            let result = self.handler.select_dropdown_option(dropdown_id, &selection_path[0], None).await;
            return ExecutionOutcome {
                success: result.success,
                message: result.message,
                available_options: result.available_options,
                selector_type: Some(result.selector_type),
            };
        }

        for (level, option_text) in selection_path.iter().enumerate() {
            let result = self
                .handler
                .select_cascade_level(dropdown_id, option_text, level as u32)
                .await;
            if !result.success {
                return ExecutionOutcome::fail(format!("Failed at cascade level {level}: {}", result.message));
            }
        }
        ExecutionOutcome::ok("Cascade selection completed successfully")
    }

    async fn execute_drag(&self, action: &Value) -> ExecutionOutcome {
        if !validate_params(
            action,
            "Drag",
            &["param.sourceCoordinates", "param.targetCoordinates"],
        ) {
            return ExecutionOutcome::fail("Missing coordinates for drag action");
        }
        let param = action.get("param").unwrap();
        let Some(source) = read_coords(&param["sourceCoordinates"]) else {
            return ExecutionOutcome::fail("Invalid sourceCoordinates for drag action");
        };
        let Some(target) = read_coords(&param["targetCoordinates"]) else {
            return ExecutionOutcome::fail("Invalid targetCoordinates for drag action");
        };
        if self.handler.drag(source, target).await {
            ExecutionOutcome::ok("Drag action successful.")
        } else {
            ExecutionOutcome::fail("Drag action failed.")
        }
    }
}

fn read_coords(value: &Value) -> Option<(f64, f64)> {
    Some((value.get("x")?.as_f64()?, value.get("y")?.as_f64()?))
}
