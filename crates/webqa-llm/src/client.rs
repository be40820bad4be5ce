use async_trait::async_trait;

use crate::errors::LlmError;

/// One or more base64 (or `data:image/...`) encoded screenshots to
/// attach to a chat request as `image_url` parts.
#[derive(Clone, Debug)]
pub enum Images {
    One(String),
    Many(Vec<String>),
}

/// The in-scope adapter around an out-of-scope LLM service: chat
/// completion with optional vision attachments, response normalization,
/// and the retry/backoff policy consumed by callers.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn get_response(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        images: Option<Images>,
        temperature: f32,
    ) -> Result<String, LlmError>;
}

/// Calls `client.get_response` up to `attempts` times with a fixed
/// `backoff` between tries, matching the planner's "2 attempts, 1s
/// backoff" retry policy. Returns the first success; the last
/// error if every attempt fails.
pub async fn get_response_with_retry(
    client: &dyn LlmClient,
    system_prompt: &str,
    user_prompt: &str,
    images: Option<Images>,
    temperature: f32,
    attempts: u32,
    backoff: std::time::Duration,
) -> Result<String, LlmError> {
    let mut last_err = None;
    for attempt in 0..attempts.max(1) {
        match client
            .get_response(system_prompt, user_prompt, images.clone(), temperature)
            .await
        {
            Ok(response) => return Ok(response),
            Err(e) => {
                tracing::warn!(attempt, error = %e, "LLM request failed, retrying");
                last_err = Some(e);
                if attempt + 1 < attempts {
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
    Err(last_err.unwrap_or(LlmError::EmptyResponse))
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use std::sync::Mutex;

    use super::*;

    /// Returns queued canned responses in order; errors once the queue
    /// is drained. Used by the UI tester and agent loop tests to drive
    /// deterministic plans.
    pub struct ScriptedClient {
        responses: Mutex<Vec<Result<String, String>>>,
    }

    impl ScriptedClient {
        pub fn new(responses: Vec<Result<String, String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().rev().collect()),
            }
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        async fn get_response(
            &self,
            _system_prompt: &str,
            _user_prompt: &str,
            _images: Option<Images>,
            _temperature: f32,
        ) -> Result<String, LlmError> {
            let mut responses = self.responses.lock().unwrap();
            match responses.pop() {
                Some(Ok(text)) => Ok(text),
                Some(Err(message)) => Err(LlmError::Request(message)),
                None => Err(LlmError::EmptyResponse),
            }
        }
    }
}
