//! LLM Client.

mod client;
mod config;
mod errors;
mod openai;
mod response;

pub use client::{get_response_with_retry, Images, LlmClient};
#[cfg(any(test, feature = "test-support"))]
pub use client::test_support;
pub use config::{LlmClientConfig, PLANNING_TEMPERATURE, VERIFICATION_TEMPERATURE};
pub use errors::LlmError;
pub use openai::OpenAiClient;
pub use response::clean_response;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::client::test_support::ScriptedClient;
    use super::*;

    #[tokio::test]
    async fn retry_succeeds_after_one_failure() {
        let client = ScriptedClient::new(vec![Err("boom".into()), Ok("hello".into())]);
        let result = get_response_with_retry(
            &client,
            "sys",
            "user",
            None,
            VERIFICATION_TEMPERATURE,
            2,
            Duration::from_millis(1),
        )
        .await
        .unwrap();
        assert_eq!(result, "hello");
    }

    #[tokio::test]
    async fn retry_exhausts_and_returns_last_error() {
        let client = ScriptedClient::new(vec![Err("first".into()), Err("second".into())]);
        let result = get_response_with_retry(
            &client,
            "sys",
            "user",
            None,
            PLANNING_TEMPERATURE,
            2,
            Duration::from_millis(1),
        )
        .await;
        assert!(result.is_err());
    }

    #[test]
    fn config_requires_openai_api_type() {
        let config = LlmClientConfig {
            api: "anthropic".to_string(),
            model: "gpt".to_string(),
            api_key: "k".to_string(),
            base_url: None,
            timeout_secs: 60,
        };
        assert!(config.validate().is_err());
    }
}
