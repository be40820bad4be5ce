//! Action Handler: low-level DOM operations keyed by
//! crawler-assigned element id. Owns a `BrowserSession` and the current
//! `ElementBuffer`; every operation returns a bool or a `{success,
//! message}` shape rather than raising for ordinary failures.

use std::path::Path;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use webqa_browser::BrowserSession;
use webqa_dom::{is_syntactically_valid_css_selector, DomElement, ElementBuffer};

use crate::dropdown::{select_by_text, DropdownSelection, SelectableOption};
use crate::errors::ActionError;
use crate::scroll;

const STRIP_ANCHOR_TARGETS_JS: &str = r#"
links = document.getElementsByTagName("a");
for (var i = 0; i < links.length; i++) {
    links[i].removeAttribute("target");
}
"#;

pub struct ActionHandler {
    session: std::sync::Arc<BrowserSession>,
    buffer: ElementBuffer,
}

impl ActionHandler {
    pub fn new(session: std::sync::Arc<BrowserSession>) -> Self {
        Self {
            session,
            buffer: ElementBuffer::new(),
        }
    }

    /// Rewrites the element buffer for the current planning turn
    ///.
    pub fn set_element_buffer(&mut self, buffer: ElementBuffer) {
        self.buffer = buffer;
    }

    /// The underlying browser session, for callers (UITester) that need
    /// capabilities beyond element-keyed DOM operations, such as
    /// reading the network/console monitoring snapshot.
    pub fn session(&self) -> &std::sync::Arc<BrowserSession> {
        &self.session
    }

    fn element(&self, id: &str) -> Option<&DomElement> {
        self.buffer.get(id)
    }

    pub async fn click(&self, id: &str) -> bool {
        let Ok(capability) = self.session.capability().await else {
            return false;
        };
        capability.evaluate(STRIP_ANCHOR_TARGETS_JS).await.ok();

        let Some(element) = self.element(id) else {
            tracing::error!(id, "element not found in buffer for click action");
            return false;
        };
        self.click_using_coordinates(element).await
    }

    async fn click_using_coordinates(&self, element: &DomElement) -> bool {
        let Ok(capability) = self.session.capability().await else {
            return false;
        };
        match (element.center_x, element.center_y) {
            (Some(x), Some(y)) => {
                if let Err(e) = capability.mouse_click(x, y).await {
                    tracing::error!(error = %e, x, y, "mouse click error");
                }
                true
            }
            _ => {
                tracing::error!("coordinates not found in element data");
                false
            }
        }
    }

    pub async fn hover(&self, id: &str) -> bool {
        let Some(element) = self.element(id) else {
            tracing::error!(id, "element not found in buffer for hover action");
            return false;
        };
        let Ok(capability) = self.session.capability().await else {
            return false;
        };
        let (Some(x), Some(y)) = (element.center_x, element.center_y) else {
            tracing::error!("coordinates not found in element data");
            return false;
        };
        let scroll_y = capability
            .evaluate("() => window.scrollY")
            .await
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        capability.mouse_move(x, y - scroll_y).await.ok();
        tokio::time::sleep(Duration::from_millis(500)).await;
        true
    }

    /// `type(id, text, clear_before_type)`: focus by clicking,
    /// optionally clear, then fill via CSS with an XPath fallback.
    pub async fn type_text(&self, id: &str, text: &str, clear_before_type: bool) -> bool {
        let Some(element) = self.element(id).cloned() else {
            tracing::error!(id, "element not found in buffer for type action");
            return false;
        };

        if clear_before_type && !self.clear(id).await {
            tracing::warn!(id, "failed to clear element before typing, attempting anyway");
        }

        if !self.click(id).await {
            return false;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;

        let ok = self.fill_with_fallback(&element, text).await;
        tokio::time::sleep(Duration::from_secs(1)).await;
        ok
    }

    pub async fn clear(&self, id: &str) -> bool {
        let Some(element) = self.element(id).cloned() else {
            tracing::error!(id, "element not found in buffer for clear action");
            return false;
        };
        if !self.click(id).await {
            tracing::warn!(id, "could not focus element before clearing, proceeding anyway");
        }
        let ok = self.fill_with_fallback(&element, "").await;
        tokio::time::sleep(Duration::from_millis(500)).await;
        ok
    }

    async fn fill_with_fallback(&self, element: &DomElement, text: &str) -> bool {
        let Ok(capability) = self.session.capability().await else {
            return false;
        };
        if let Some(selector) = element.selector.as_deref() {
            if is_syntactically_valid_css_selector(selector) {
                if capability.fill_css(selector, text).await.is_ok() {
                    return true;
                }
                tracing::warn!(selector, "CSS selector fill failed, trying XPath");
            } else {
                tracing::warn!(selector, "invalid CSS selector format, using XPath directly");
            }
        }
        match element.xpath.as_deref() {
            Some(xpath) if !xpath.is_empty() => match capability.fill_xpath(xpath, text).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::error!(error = %e, xpath, "XPath fill failed");
                    false
                }
            },
            _ => {
                tracing::error!("no usable CSS selector or XPath for element");
                false
            }
        }
    }

    pub async fn scroll(&self, direction: &str, scroll_type: &str, distance: Option<i64>) -> bool {
        let Ok(capability) = self.session.capability().await else {
            return false;
        };
        scroll::scroll(&*capability, direction, scroll_type, distance).await
    }

    pub async fn keyboard_press(&self, key: &str) -> bool {
        let Ok(capability) = self.session.capability().await else {
            return false;
        };
        if let Err(e) = capability.keyboard_press(key).await {
            tracing::error!(error = %e, key, "keyboard press failed");
            return false;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
        true
    }

    pub async fn go_back(&self) -> bool {
        let Ok(capability) = self.session.capability().await else {
            return false;
        };
        match capability.go_back().await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "failed to navigate back");
                false
            }
        }
    }

    /// Selects the newest context page if more than one exists.
    pub async fn get_new_page(&self) -> bool {
        let Ok(capability) = self.session.capability().await else {
            return false;
        };
        if capability.context_page_count().await > 1 {
            if let Err(e) = capability.switch_to_newest_page().await {
                tracing::error!(error = %e, "failed to get new page");
                return false;
            }
        }
        true
    }

    pub async fn take_screenshot(&self, full_page: bool, timeout_ms: u64) -> Result<Vec<u8>, ActionError> {
        let capability = self.session.capability().await?;
        if let Err(e) = capability.wait_for_load_state("load", 60_000).await {
            tracing::warn!(error = %e, "wait_for_load_state before screenshot failed, attempting anyway");
        }
        capability
            .screenshot(full_page, timeout_ms)
            .await
            .map_err(ActionError::Screenshot)
    }

    /// `b64_page_screenshot`: wraps as a `data:image/png;base64,...`
    /// string, failing gracefully back to the raw capture on a
    /// load-state wait failure (handled inside `take_screenshot`).
    pub async fn b64_page_screenshot(&self, full_page: bool) -> Result<String, ActionError> {
        let bytes = self.take_screenshot(full_page, 30_000).await?;
        Ok(format!("data:image/png;base64,{}", BASE64.encode(bytes)))
    }

    /// Enumerates all `input[type=file]` elements, picks the first
    /// whose `accept` matches the first valid path's extension (else
    /// the first available), and uploads. `paths=[]` returns false
    /// without touching the page.
    pub async fn upload_file(&self, paths: &[String]) -> bool {
        let valid_paths: Vec<String> = paths
            .iter()
            .filter(|p| !p.is_empty() && Path::new(p).exists())
            .cloned()
            .collect();
        if valid_paths.is_empty() {
            tracing::error!("no valid files to upload");
            return false;
        }
        let extension = Path::new(&valid_paths[0])
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default();

        let Ok(capability) = self.session.capability().await else {
            return false;
        };
        let script = format!(
            "__webqaListFileInputs({})",
            serde_json::to_string(&extension).unwrap_or_else(|_| "\"\"".to_string())
        );
        let raw = match capability.evaluate(&script).await {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "failed to enumerate file inputs");
                return false;
            }
        };
        let inputs: Vec<FileInputDescriptor> = match serde_json::from_value(raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "unexpected file-input enumeration shape");
                return false;
            }
        };
        if inputs.is_empty() {
            tracing::error!("no file input elements found");
            return false;
        }
        let selected = inputs
            .iter()
            .find(|i| i.accepts_file)
            .unwrap_or(&inputs[0]);

        if let Err(e) = capability.set_input_files(&selected.selector, valid_paths).await {
            tracing::error!(error = %e, "upload failed");
            return false;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
        true
    }

    /// Priority `option_id`: clicked directly. Otherwise use
    /// `dropdown_id` to detect the widget kind and select by text
    /// match priority.
    pub async fn select_dropdown_option(
        &self,
        dropdown_id: &str,
        option_text: &str,
        option_id: Option<&str>,
    ) -> DropdownSelection {
        if let Some(option_id) = option_id {
            if let Some(element) = self.element(option_id) {
                if let (Some(x), Some(y)) = (element.center_x, element.center_y) {
                    let Ok(capability) = self.session.capability().await else {
                        return DropdownSelection {
                            success: false,
                            message: "browser capability unavailable".to_string(),
                            selected_value: None,
                            selector_type: "unknown".to_string(),
                            available_options: None,
                        };
                    };
                    capability.mouse_click(x, y).await.ok();
                    return DropdownSelection {
                        success: true,
                        message: format!("Clicked dropdown option '{option_text}' directly."),
                        selected_value: Some(element.inner_text.clone()),
                        selector_type: "ant_select_option".to_string(),
                        available_options: None,
                    };
                }
            }
            tracing::warn!(option_id, "option_id not found in buffer, falling back to dropdown_id");
        }

        let Some(element) = self.element(dropdown_id) else {
            return DropdownSelection {
                success: false,
                message: format!("dropdown_id {dropdown_id} not found in buffer"),
                selected_value: None,
                selector_type: "unknown".to_string(),
                available_options: None,
            };
        };
        let (Some(x), Some(y)) = (element.center_x, element.center_y) else {
            return DropdownSelection {
                success: false,
                message: format!("dropdown_id {dropdown_id} has no coordinates"),
                selected_value: None,
                selector_type: "unknown".to_string(),
                available_options: None,
            };
        };
        let Ok(capability) = self.session.capability().await else {
            return DropdownSelection {
                success: false,
                message: "browser capability unavailable".to_string(),
                selected_value: None,
                selector_type: "unknown".to_string(),
                available_options: None,
            };
        };
        select_by_text(&*capability, (x, y), option_text).await
    }

    /// Clicks the level-N menu item in an ant-cascader, pausing between
    /// levels.
    pub async fn select_cascade_level(&self, id: &str, option_text: &str, level: u32) -> DropdownSelection {
        let Some(element) = self.element(id) else {
            return DropdownSelection {
                success: false,
                message: format!("id {id} not found in buffer"),
                selected_value: None,
                selector_type: "ant_cascader".to_string(),
                available_options: None,
            };
        };
        let (Some(x), Some(y)) = (element.center_x, element.center_y) else {
            return DropdownSelection {
                success: false,
                message: format!("id {id} has no coordinates"),
                selected_value: None,
                selector_type: "ant_cascader".to_string(),
                available_options: None,
            };
        };
        let Ok(capability) = self.session.capability().await else {
            return DropdownSelection {
                success: false,
                message: "browser capability unavailable".to_string(),
                selected_value: None,
                selector_type: "ant_cascader".to_string(),
                available_options: None,
            };
        };
        let script = format!("__webqaDescribeCascaderLevel({x}, {y}, {level})");
        let raw = match capability.evaluate(&script).await {
            Ok(v) => v,
            Err(e) => {
                return DropdownSelection {
                    success: false,
                    message: format!("cascader level probe failed: {e}"),
                    selected_value: None,
                    selector_type: "ant_cascader".to_string(),
                    available_options: None,
                }
            }
        };
        let options: Vec<SelectableOption> = serde_json::from_value(raw).unwrap_or_default();
        let result = match crate::dropdown::match_priority(&options, option_text) {
            Some(option) => {
                capability.mouse_click(option.center_x, option.center_y).await.ok();
                DropdownSelection {
                    success: true,
                    message: format!("Selected cascader level {level} option \"{}\"", option.text),
                    selected_value: Some(option.text.clone()),
                    selector_type: "ant_cascader".to_string(),
                    available_options: None,
                }
            }
            None => DropdownSelection {
                success: false,
                message: format!("Option \"{option_text}\" not found at cascader level {level}"),
                selected_value: None,
                selector_type: "ant_cascader".to_string(),
                available_options: Some(options.into_iter().map(|o| o.text).collect()),
            },
        };
        tokio::time::sleep(Duration::from_millis(500)).await;
        result
    }

    pub async fn drag(&self, source: (f64, f64), target: (f64, f64)) -> bool {
        let Ok(capability) = self.session.capability().await else {
            return false;
        };
        if capability.mouse_move(source.0, source.1).await.is_err() {
            tracing::error!("drag action failed moving to source");
            return false;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        if capability.mouse_down().await.is_err() {
            tracing::error!("drag action failed during press phase");
            return false;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        if capability.mouse_move(target.0, target.1).await.is_err() {
            tracing::error!("drag action failed during move phase");
            return false;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        if capability.mouse_up().await.is_err() {
            tracing::error!("drag action failed during release phase");
            return false;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
        true
    }
}

#[derive(serde::Deserialize)]
struct FileInputDescriptor {
    selector: String,
    #[serde(default)]
    #[allow(dead_code)]
    accept: String,
    #[serde(rename = "acceptsFile")]
    accepts_file: bool,
}
