//! Planner/verification prompt templates, grounded on the
//! source's `LLMPrompt` constants. Kept short: these are instructions to
//! the model, not behavior this crate executes.

pub const PLANNER_SYSTEM_PROMPT: &str = "\
You are a web QA agent. Given a test step, the current page's interactive \
elements (by short id), and the full page text, respond with a JSON object \
of the shape {\"actions\": [{\"type\": ..., \"locate\": {...}, \"param\": {...}}]}. \
Use only element ids present in pageDescription. Respond with JSON only.";

pub const PLANNER_OUTPUT_PROMPT: &str = "\
Plan the minimal sequence of actions needed to complete the test step above.";

pub const VERIFICATION_SYSTEM_PROMPT: &str = "\
You are a web QA agent verifying an assertion against a page. Respond with a \
JSON object {\"Validation Result\": \"Validation Passed\"|\"Validation Failed\", \
\"Details\": [...]}.";

pub const VERIFICATION_PROMPT: &str = "\
Determine whether the assertion holds given the screenshots and page text above.";

/// Mirrors `_prepare_prompt`: test step + pageDescription + page_structure
/// + a trailing instruction template.
pub fn prepare_prompt(instruction: &str, page_description: &str, template: &str, page_structure: &str) -> String {
    format!(
        "test step: {instruction}\n\
         ====================\n\
         pageDescription (interactive elements): {page_description}\n\
         ====================\n\
         page_structure (full text content): {page_structure}\n\
         ====================\n\
         {template}"
    )
}
