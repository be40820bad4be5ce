//! Cookie normalization: accepts a JSON string, a single object, or a
//! list, and always produces `Vec<Value>` for `add_cookies`.

use serde_json::Value;

use crate::errors::BrowserError;

pub fn normalize_cookies(raw: &Value) -> Result<Vec<Value>, BrowserError> {
    match raw {
        Value::String(s) => {
            let parsed: Value = serde_json::from_str(s)
                .map_err(|e| BrowserError::InvalidCookies(format!("invalid cookie JSON: {e}")))?;
            normalize_cookies(&parsed)
        }
        Value::Object(_) => Ok(vec![raw.clone()]),
        Value::Array(items) => Ok(items.clone()),
        other => Err(BrowserError::InvalidCookies(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_json_string() {
        let raw = json!(r#"[{"name":"a","value":"b"}]"#);
        let cookies = normalize_cookies(&raw).unwrap();
        assert_eq!(cookies.len(), 1);
    }

    #[test]
    fn normalizes_single_object() {
        let raw = json!({"name": "a", "value": "b"});
        let cookies = normalize_cookies(&raw).unwrap();
        assert_eq!(cookies.len(), 1);
    }

    #[test]
    fn normalizes_list() {
        let raw = json!([{"name": "a"}, {"name": "b"}]);
        let cookies = normalize_cookies(&raw).unwrap();
        assert_eq!(cookies.len(), 2);
    }

    #[test]
    fn rejects_number() {
        assert!(normalize_cookies(&json!(42)).is_err());
    }
}
