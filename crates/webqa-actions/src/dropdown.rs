//! `select_dropdown_option` / `select_cascade_level`: page-side
//! detection among native `<select>`, Ant Design `.ant-select`,
//! `.ant-cascader`, and generic `role=combobox|listbox` widgets, with a
//! priority-ordered text match (exact, then contains, then
//! is-substring-of).
//!
//! The actual widget-kind detection and option enumeration runs as a
//! page-side evaluate (an out-of-scope browser-automation concern);
//! this module owns the part that is genuinely testable without a
//! browser: the match-priority algorithm, and the decision of which
//! option (if any) to click.

use serde::{Deserialize, Serialize};
use webqa_browser::BrowserCapability;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SelectableOption {
    pub text: String,
    pub value: Option<String>,
    pub center_x: f64,
    pub center_y: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SelectableQuery {
    pub selector_type: String,
    pub options: Vec<SelectableOption>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DropdownSelection {
    pub success: bool,
    pub message: String,
    pub selected_value: Option<String>,
    pub selector_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_options: Option<Vec<String>>,
}

/// Exact match wins; otherwise the first option whose text contains
/// `target`; otherwise the first option that is itself a substring of
/// `target`. `None` if nothing matches by any rule.
pub fn match_priority<'a>(options: &'a [SelectableOption], target: &str) -> Option<&'a SelectableOption> {
    if let Some(exact) = options.iter().find(|o| o.text == target) {
        return Some(exact);
    }
    if let Some(contains) = options.iter().find(|o| o.text.contains(target)) {
        return Some(contains);
    }
    options.iter().find(|o| target.contains(&o.text))
}

/// Builds the evaluate script for a widget query centered on
/// `(center_x, center_y)`. The concrete adapter implementing
/// `BrowserCapability::evaluate` is responsible for actually walking
/// the DOM at that point and returning a `SelectableQuery`-shaped JSON
/// payload; this crate only shapes the request and interprets the
/// response.
pub fn query_script(center_x: f64, center_y: f64) -> String {
    format!(
        "__webqaDescribeSelectableAt({center_x}, {center_y})",
    )
}

pub async fn select_by_text(
    capability: &dyn BrowserCapability,
    dropdown_center: (f64, f64),
    target_text: &str,
) -> DropdownSelection {
    let raw = match capability
        .evaluate(&query_script(dropdown_center.0, dropdown_center.1))
        .await
    {
        Ok(v) => v,
        Err(e) => {
            return DropdownSelection {
                success: false,
                message: format!("dropdown probe failed: {e}"),
                selected_value: None,
                selector_type: "unknown".to_string(),
                available_options: None,
            }
        }
    };

    let query: SelectableQuery = match serde_json::from_value(raw) {
        Ok(q) => q,
        Err(e) => {
            return DropdownSelection {
                success: false,
                message: format!("dropdown probe returned unexpected shape: {e}"),
                selected_value: None,
                selector_type: "unknown".to_string(),
                available_options: None,
            }
        }
    };

    match match_priority(&query.options, target_text) {
        Some(option) => {
            if capability
                .mouse_click(option.center_x, option.center_y)
                .await
                .is_err()
            {
                return DropdownSelection {
                    success: false,
                    message: format!("click on matched option '{}' failed", option.text),
                    selected_value: None,
                    selector_type: query.selector_type,
                    available_options: None,
                };
            }
            DropdownSelection {
                success: true,
                message: format!("Successfully selected option: \"{}\"", option.text),
                selected_value: option.value.clone().or_else(|| Some(option.text.clone())),
                selector_type: query.selector_type,
                available_options: None,
            }
        }
        None => DropdownSelection {
            success: false,
            message: format!(
                "Option \"{target_text}\" not found. Available: {}",
                query
                    .options
                    .iter()
                    .map(|o| o.text.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            selected_value: None,
            selector_type: query.selector_type,
            available_options: Some(query.options.into_iter().map(|o| o.text).collect()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opt(text: &str) -> SelectableOption {
        SelectableOption {
            text: text.to_string(),
            value: None,
            center_x: 0.0,
            center_y: 0.0,
        }
    }

    #[test]
    fn exact_match_wins_over_contains() {
        let options = vec![opt("Option A Extended"), opt("Option A")];
        let matched = match_priority(&options, "Option A").unwrap();
        assert_eq!(matched.text, "Option A");
    }

    #[test]
    fn falls_back_to_contains() {
        let options = vec![opt("Option A Extended")];
        let matched = match_priority(&options, "Option A").unwrap();
        assert_eq!(matched.text, "Option A Extended");
    }

    #[test]
    fn falls_back_to_is_substring_of_target() {
        let options = vec![opt("A")];
        let matched = match_priority(&options, "Option A Extended").unwrap();
        assert_eq!(matched.text, "A");
    }

    #[test]
    fn no_match_returns_none() {
        let options = vec![opt("B"), opt("C")];
        assert!(match_priority(&options, "Option A").is_none());
    }
}
