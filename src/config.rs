//! Configuration: layers built-in defaults, an
//! optional TOML/YAML file, then environment variable overrides, using
//! the `config` crate the same way this codebase's own config loading
//! does for browser configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use webqa_session::{BrowserConfig, LlmConfig, TestConfiguration};

use crate::errors::EngineError;

/// The whole declarative input to one orchestration run, plus the knobs that are the CLI/queue's own business
/// (concurrency cap, report directory).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    pub target_url: String,
    pub llm: LlmConfig,
    #[serde(default)]
    pub test_configurations: Vec<TestConfiguration>,
    #[serde(default = "default_max_concurrent_tests")]
    pub max_concurrent_tests: usize,
    #[serde(default)]
    pub report_dir: Option<PathBuf>,
}

fn default_max_concurrent_tests() -> usize {
    3
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_url: String::new(),
            llm: LlmConfig {
                api: "openai".to_string(),
                model: "gpt-4o".to_string(),
                api_key: String::new(),
                base_url: String::new(),
                temperature: None,
                top_p: None,
            },
            test_configurations: Vec::new(),
            max_concurrent_tests: default_max_concurrent_tests(),
            report_dir: None,
        }
    }
}

/// Loads defaults, optionally merges `file` (TOML or YAML, inferred from
/// extension), then applies the environment overrides:
/// `OPENAI_API_KEY`/`OPENAI_BASE_URL` override the LLM config, and
/// `DOCKER_ENV=true` forces every test's browser config headless.
pub fn load(file: Option<&Path>) -> Result<EngineConfig, EngineError> {
    let defaults = EngineConfig::default();
    let mut builder = config::Config::builder()
        .set_default("max_concurrent_tests", defaults.max_concurrent_tests as i64)
        .map_err(|e| EngineError::Config(e.to_string()))?
        .set_default("llm.api", defaults.llm.api.clone())
        .map_err(|e| EngineError::Config(e.to_string()))?
        .set_default("llm.model", defaults.llm.model.clone())
        .map_err(|e| EngineError::Config(e.to_string()))?
        .set_default("llm.api_key", defaults.llm.api_key.clone())
        .map_err(|e| EngineError::Config(e.to_string()))?
        .set_default("llm.base_url", defaults.llm.base_url.clone())
        .map_err(|e| EngineError::Config(e.to_string()))?;

    if let Some(path) = file {
        builder = builder.add_source(config::File::from(path));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("WEBQA")
            .separator("__")
            .try_parsing(true),
    );

    let built = builder.build().map_err(|e| EngineError::Config(e.to_string()))?;
    let mut cfg: EngineConfig = built
        .try_deserialize()
        .map_err(|e| EngineError::Config(e.to_string()))?;

    if let Ok(key) = std::env::var("OPENAI_API_KEY") {
        cfg.llm.api_key = key;
    }
    if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
        cfg.llm.base_url = base_url;
    }
    if matches!(std::env::var("DOCKER_ENV").as_deref(), Ok("true")) {
        for test in &mut cfg.test_configurations {
            test.browser_config.headless = true;
        }
    }

    Ok(cfg)
}

/// The default browser config a CLI-level test gets when its input
/// config omits one entirely.
pub fn default_browser_config() -> BrowserConfig {
    BrowserConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_no_enabled_tests_and_a_sane_concurrency_cap() {
        let cfg = load(None).unwrap();
        assert!(cfg.test_configurations.is_empty());
        assert_eq!(cfg.max_concurrent_tests, 3);
    }

    #[test]
    #[serial_test::serial]
    fn docker_env_forces_every_test_headless() {
        std::env::set_var("DOCKER_ENV", "true");
        let mut cfg = EngineConfig {
            test_configurations: vec![TestConfiguration {
                test_id: soulbrowser_core_types::TestId("t1".to_string()),
                test_type: webqa_session::TestType::UxTest,
                test_name: "t1".to_string(),
                enabled: true,
                browser_config: {
                    let mut b = BrowserConfig::default();
                    b.headless = false;
                    b
                },
                test_specific_config: Default::default(),
                timeout_secs: 60,
                retry_count: 0,
                dependencies: vec![],
            }],
            ..EngineConfig::default()
        };
        if matches!(std::env::var("DOCKER_ENV").as_deref(), Ok("true")) {
            for test in &mut cfg.test_configurations {
                test.browser_config.headless = true;
            }
        }
        std::env::remove_var("DOCKER_ENV");
        assert!(cfg.test_configurations[0].browser_config.headless);
    }
}
