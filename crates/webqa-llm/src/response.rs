/// Strips ```json ... ``` / ``` ... ``` fences a model sometimes wraps
/// its answer in. Anything
/// else passes through unchanged.
pub fn clean_response(response: &str) -> String {
    let trimmed = response.trim();
    if let Some(inner) = trimmed.strip_prefix("```json") {
        if let Some(inner) = inner.strip_suffix("```") {
            return inner.trim().to_string();
        }
    }
    if let Some(inner) = trimmed.strip_prefix("```") {
        if let Some(inner) = inner.strip_suffix("```") {
            return inner.trim().to_string();
        }
    }
    response.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fence() {
        assert_eq!(clean_response("```json\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn strips_bare_fence() {
        assert_eq!(clean_response("```\nhello\n```"), "hello");
    }

    #[test]
    fn passes_through_unfenced_text() {
        assert_eq!(clean_response("hello"), "hello");
    }

    #[test]
    fn leaves_partial_fence_untouched() {
        assert_eq!(clean_response("```json\n{\"a\":1}"), "```json\n{\"a\":1}");
    }
}
