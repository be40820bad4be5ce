//! Browser Session and Session Manager.

mod capability;
mod cookies;
mod errors;
mod manager;
mod navigate;
mod session;

pub use capability::{BrowserCapability, BrowserLauncher};
pub use cookies::normalize_cookies;
pub use errors::BrowserError;
pub use manager::SessionManager;
pub use navigate::{normalize_url, urls_equivalent};
pub use session::{BrowserSession, CapabilityGuard, MonitoringSnapshot, SharedBrowserSession};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    //! An in-memory `BrowserCapability` used by this workspace's own
    //! test suites (webqa-actions, webqa-ui-tester, ...). Not part of
    //! the engine's external interface — purely test scaffolding.
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::Value;

    use crate::capability::{BrowserCapability, BrowserLauncher};
    use crate::errors::BrowserError;

    #[derive(Default)]
    pub struct MockCapability {
        pub url: Mutex<String>,
        pub body_text: Mutex<String>,
        pub clicks: Mutex<Vec<(f64, f64)>>,
        pub cookies: Mutex<Vec<Value>>,
        pub fail_goto: Mutex<Option<String>>,
        pub network: Mutex<Option<Value>>,
        pub console: Mutex<Option<Value>>,
    }

    #[async_trait]
    impl BrowserCapability for MockCapability {
        async fn goto(&self, url: &str, _wait_until: &str, _timeout_ms: u64) -> Result<(), String> {
            if let Some(reason) = self.fail_goto.lock().unwrap().clone() {
                return Err(reason);
            }
            *self.url.lock().unwrap() = url.to_string();
            Ok(())
        }

        async fn wait_for_load_state(&self, _state: &str, _timeout_ms: u64) -> Result<(), String> {
            Ok(())
        }

        async fn evaluate(&self, script: &str) -> Result<Value, String> {
            if script.contains("innerText") {
                let blank = self.body_text.lock().unwrap().trim().is_empty();
                return Ok(Value::Bool(blank));
            }
            Ok(Value::Null)
        }

        async fn add_cookies(&self, cookies: Vec<Value>) -> Result<(), String> {
            self.cookies.lock().unwrap().extend(cookies);
            Ok(())
        }

        async fn current_url(&self) -> String {
            self.url.lock().unwrap().clone()
        }

        async fn screenshot(&self, _full_page: bool, _timeout_ms: u64) -> Result<Vec<u8>, String> {
            Ok(vec![0x89, b'P', b'N', b'G'])
        }

        async fn mouse_click(&self, x: f64, y: f64) -> Result<(), String> {
            self.clicks.lock().unwrap().push((x, y));
            Ok(())
        }

        async fn mouse_move(&self, _x: f64, _y: f64) -> Result<(), String> {
            Ok(())
        }

        async fn mouse_down(&self) -> Result<(), String> {
            Ok(())
        }

        async fn mouse_up(&self) -> Result<(), String> {
            Ok(())
        }

        async fn keyboard_press(&self, _key: &str) -> Result<(), String> {
            Ok(())
        }

        async fn fill_css(&self, _selector: &str, _text: &str) -> Result<(), String> {
            Ok(())
        }

        async fn fill_xpath(&self, _xpath: &str, _text: &str) -> Result<(), String> {
            Ok(())
        }

        async fn set_input_files(&self, _selector: &str, _paths: Vec<String>) -> Result<(), String> {
            Ok(())
        }

        async fn context_page_count(&self) -> usize {
            1
        }

        async fn switch_to_newest_page(&self) -> Result<(), String> {
            Ok(())
        }

        async fn scroll_by(&self, _dx: f64, _dy: f64) -> Result<(), String> {
            Ok(())
        }

        async fn scroll_position(&self) -> Result<(f64, f64), String> {
            Ok((0.0, 0.0))
        }

        async fn viewport_inner_height(&self) -> Result<f64, String> {
            Ok(800.0)
        }

        async fn go_back(&self) -> Result<(), String> {
            Ok(())
        }

        async fn network_messages(&self) -> Value {
            self.network
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| serde_json::json!({"responses": [], "failed_requests": []}))
        }

        async fn console_messages(&self) -> Value {
            self.console.lock().unwrap().clone().unwrap_or_else(|| serde_json::json!([]))
        }

        async fn close(&self) -> Result<(), String> {
            Ok(())
        }
    }

    pub struct MockLauncher;

    #[async_trait]
    impl BrowserLauncher for MockLauncher {
        async fn launch(
            &self,
            _config: &webqa_session::BrowserConfig,
        ) -> Result<Box<dyn BrowserCapability>, BrowserError> {
            Ok(Box::new(MockCapability::default()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::MockLauncher;
    use super::*;
    use webqa_session::BrowserConfig;

    #[tokio::test]
    async fn session_navigate_rejects_blank_page() {
        let session = BrowserSession::new(BrowserConfig::default());
        session.initialize(&MockLauncher).await.unwrap();
        // body_text left empty in the default mock -> blank page.
        let err = session.navigate("https://example.test", None).await;
        assert!(matches!(err, Err(BrowserError::BlankPageError(_))));
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let session = BrowserSession::new(BrowserConfig::default());
        session.initialize(&MockLauncher).await.unwrap();
        session.close().await;
        session.close().await;
        assert!(session.is_closed_blocking());
    }

    #[tokio::test]
    async fn monitoring_snapshot_reflects_capability_signals() {
        use super::test_support::MockCapability;
        use std::sync::Mutex;

        struct FixedLauncher;

        #[async_trait::async_trait]
        impl BrowserLauncher for FixedLauncher {
            async fn launch(
                &self,
                _config: &BrowserConfig,
            ) -> Result<Box<dyn BrowserCapability>, BrowserError> {
                Ok(Box::new(MockCapability {
                    network: Mutex::new(Some(serde_json::json!({"responses": [1], "failed_requests": [1, 2]}))),
                    console: Mutex::new(Some(serde_json::json!(["boom"]))),
                    ..Default::default()
                }))
            }
        }

        let session = BrowserSession::new(BrowserConfig::default());
        session.initialize(&FixedLauncher).await.unwrap();
        let snapshot = session.monitoring_snapshot().await;
        assert_eq!(snapshot.network["failed_requests"].as_array().unwrap().len(), 2);
        assert_eq!(snapshot.console.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn manager_tracks_and_closes_sessions() {
        let manager = SessionManager::new();
        let session = manager
            .create_session(BrowserConfig::default(), &MockLauncher)
            .await
            .unwrap();
        assert_eq!(manager.len(), 1);
        manager.close_session(&session.session_id).await;
        assert_eq!(manager.len(), 0);
    }
}
