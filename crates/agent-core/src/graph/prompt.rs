//! Planner/reflector prompt templates. Short by design: these
//! are instructions handed to the model, not logic this crate runs.

pub const PLANNER_SYSTEM_PROMPT: &str = "\
You are a web QA test planner. Given the target URL and business objectives, \
respond with a JSON array of test cases, each an object with at least \
`name`, `objective`, `success_criteria`, `steps` (each {\"action\": ...} or \
{\"verify\": ...}), `preamble_actions`, `reset_session`, `url`. Respond with JSON only.";

pub const REFLECTOR_SYSTEM_PROMPT: &str = "\
You are reviewing QA test case progress. Respond with JSON \
{\"decision\": \"CONTINUE\"|\"REPLAN\"|\"FINISH\", \"reasoning\": ..., \"new_plan\"?: [...]}.";

pub fn planner_user_prompt(target_url: &str, business_objectives: &str) -> String {
    format!(
        "target_url: {target_url}\n\
         business_objectives: {business_objectives}\n\
         Produce the initial set of test cases as a JSON array."
    )
}

pub fn reflector_user_prompt(
    business_objectives: &str,
    current_plan: &str,
    completed_cases: &str,
    page_structure: &str,
    interactive_elements: &str,
) -> String {
    format!(
        "business_objectives: {business_objectives}\n\
         current_plan: {current_plan}\n\
         completed_cases: {completed_cases}\n\
         page_structure: {page_structure}\n\
         interactive_elements: {interactive_elements}\n\
         Decide whether to continue, replan, or finish."
    )
}
