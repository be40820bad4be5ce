use async_trait::async_trait;
use serde_json::{json, Value};

use crate::client::{Images, LlmClient};
use crate::config::LlmClientConfig;
use crate::errors::LlmError;
use crate::response::clean_response;

/// OpenAI-compatible chat completion adapter, built around the
/// `AsyncOpenAI`-backed `LLMAPI`: one `reqwest::Client`, a
/// configured base URL, chat messages with optional `image_url` parts.
pub struct OpenAiClient {
    config: LlmClientConfig,
    http: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(config: LlmClientConfig) -> Result<Self, LlmError> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Config(e.to_string()))?;
        Ok(Self { config, http })
    }

    fn endpoint(&self) -> String {
        let base = self
            .config
            .base_url
            .clone()
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string());
        format!("{}/chat/completions", base.trim_end_matches('/'))
    }

    fn build_messages(&self, system_prompt: &str, user_prompt: &str, images: Option<Images>) -> Value {
        let mut content = vec![json!({"type": "text", "text": user_prompt})];
        if let Some(images) = images {
            let urls: Vec<String> = match images {
                Images::One(url) => vec![url],
                Images::Many(urls) => urls,
            };
            for url in urls {
                content.push(json!({
                    "type": "image_url",
                    "image_url": {"url": url, "detail": "low"}
                }));
            }
        }
        json!([
            {"role": "system", "content": system_prompt},
            {"role": "user", "content": content}
        ])
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn get_response(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        images: Option<Images>,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let body = json!({
            "model": self.config.model,
            "messages": self.build_messages(system_prompt, user_prompt, images),
            "temperature": temperature,
        });

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::Request(format!("HTTP {status}: {text}")));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(LlmError::EmptyResponse)?;

        Ok(clean_response(content))
    }
}
