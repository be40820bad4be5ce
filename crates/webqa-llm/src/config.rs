use serde::{Deserialize, Serialize};

/// Temperature defaults: deterministic for verification,
/// slightly warmer for planning/reflection.
pub const VERIFICATION_TEMPERATURE: f32 = 0.0;
pub const PLANNING_TEMPERATURE: f32 = 0.1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LlmClientConfig {
    pub api: String,
    pub model: String,
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    60
}

impl LlmClientConfig {
    pub fn validate(&self) -> Result<(), crate::errors::LlmError> {
        if self.api != "openai" {
            return Err(crate::errors::LlmError::Config(format!(
                "unsupported api type: {}",
                self.api
            )));
        }
        if self.api_key.is_empty() {
            return Err(crate::errors::LlmError::Config(
                "API key is empty".to_string(),
            ));
        }
        Ok(())
    }
}
