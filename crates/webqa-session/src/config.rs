//! Test configuration: the declarative input to one orchestration run.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use soulbrowser_core_types::TestId;

/// `test_type` from the input configuration (see ).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    UiAgentLanggraph,
    UxTest,
    Performance,
    WebBasicCheck,
    ButtonTest,
    Security,
}

impl TestType {
    /// Whether this test kind drives a browser at all. SECURITY_TEST is the
    /// one kind that runs without a BrowserSession (see webqa-scheduler).
    pub fn requires_browser(self) -> bool {
        !matches!(self, TestType::Security)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport {
                width: 1920,
                height: 1080,
            },
            headless: true,
            language: "en-US".to_string(),
            cookies: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BrowserConfig {
    pub viewport: Viewport,
    pub headless: bool,
    pub language: String,
    #[serde(default)]
    pub cookies: Vec<serde_json::Value>,
}

/// Declarative description of one test to run within a session. Immutable
/// once the session is assembled.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestConfiguration {
    pub test_id: TestId,
    pub test_type: TestType,
    pub test_name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub browser_config: BrowserConfig,
    #[serde(default)]
    pub test_specific_config: HashMap<String, serde_json::Value>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub retry_count: u32,
    #[serde(default)]
    pub dependencies: Vec<TestId>,
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    300
}

impl TestConfiguration {
    pub fn is_leaf(&self) -> bool {
        self.dependencies.is_empty()
    }

    pub fn business_objectives(&self) -> Option<&str> {
        self.test_specific_config
            .get("business_objectives")
            .and_then(|v| v.as_str())
    }

    pub fn cookies(&self) -> Option<&serde_json::Value> {
        self.test_specific_config.get("cookies")
    }
}

/// LLM config, consumed as-is by webqa-llm.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LlmConfig {
    pub api: String,
    pub model: String,
    pub api_key: String,
    pub base_url: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub top_p: Option<f32>,
}
