//! Dotted-path required-parameter validation, mirroring the
//! source's `_validate_params`: walks `action["a"]["b"]` for each
//! `"a.b"` entry and fails if any segment resolves to `null`/missing.
//! Scroll's `param.distance` is the one parameter allowed to be absent
//! (it defaults to half the viewport height downstream).

use serde_json::Value;

pub fn validate_params(action: &Value, action_type: &str, required: &[&str]) -> bool {
    for path in required {
        let mut value = action;
        let mut missing = false;
        for key in path.split('.') {
            match value.get(key) {
                Some(v) if !v.is_null() => value = v,
                _ => {
                    missing = true;
                    break;
                }
            }
        }
        if missing {
            if action_type == "Scroll" && path.ends_with("distance") {
                continue;
            }
            tracing::error!(param = path, action_type, "missing required parameter");
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detects_missing_nested_param() {
        let action = json!({"type": "Tap", "locate": {}});
        assert!(!validate_params(&action, "Tap", &["locate.id"]));
    }

    #[test]
    fn accepts_present_nested_param() {
        let action = json!({"type": "Tap", "locate": {"id": "3"}});
        assert!(validate_params(&action, "Tap", &["locate.id"]));
    }

    #[test]
    fn scroll_distance_is_optional() {
        let action = json!({"type": "Scroll", "param": {"direction": "down", "scrollType": "once"}});
        assert!(validate_params(
            &action,
            "Scroll",
            &["param.direction", "param.scrollType", "param.distance"]
        ));
    }
}
