//! One isolated browser + page, owned by exactly one running test at a
//! time.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use webqa_session::BrowserConfig;

use crate::capability::{BrowserCapability, BrowserLauncher};
use crate::cookies::normalize_cookies;
use crate::errors::BrowserError;

const NAVIGATION_TIMEOUT_MS: u64 = 60_000;
const NETWORKIDLE_TIMEOUT_MS: u64 = 60_000;

struct Inner {
    capability: Option<Box<dyn BrowserCapability>>,
    closed: bool,
}

/// A per-session lock guarding
/// `initialize`/`navigate_to`/`close` so that close() is idempotent
/// even under concurrent callers.
pub struct BrowserSession {
    pub session_id: String,
    pub browser_config: BrowserConfig,
    inner: Mutex<Inner>,
}

impl BrowserSession {
    pub fn new(browser_config: BrowserConfig) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            browser_config,
            inner: Mutex::new(Inner {
                capability: None,
                closed: false,
            }),
        }
    }

    /// Launches a fresh browser via `launcher` and stores the resulting
    /// capability. On any launch failure the session is left closed and
    /// any partially-acquired resources are released.
    pub async fn initialize(
        &self,
        launcher: &dyn BrowserLauncher,
    ) -> Result<(), BrowserError> {
        let mut guard = self.inner.lock().await;
        if guard.closed {
            return Err(BrowserError::Closed);
        }
        debug!(session_id = %self.session_id, "initializing browser session");
        match launcher.launch(&self.browser_config).await {
            Ok(capability) => {
                guard.capability = Some(capability);
                debug!(session_id = %self.session_id, "browser session initialized");
                Ok(())
            }
            Err(e) => {
                error!(session_id = %self.session_id, error = %e, "failed to initialize browser session");
                guard.closed = true;
                guard.capability = None;
                Err(e)
            }
        }
    }

    /// Navigates to `url`, normalizing `cookies` (string/object/list)
    /// and injecting them before `goto`. Waits `domcontentloaded` then
    /// `networkidle` (60s cap); fails with `BlankPageError` if the body
    /// text is empty afterward.
    pub async fn navigate(
        &self,
        url: &str,
        cookies: Option<&Value>,
    ) -> Result<(), BrowserError> {
        let guard = self.inner.lock().await;
        if guard.closed {
            return Err(BrowserError::Closed);
        }
        let capability = guard.capability.as_ref().ok_or(BrowserError::NotInitialized)?;

        if let Some(raw) = cookies {
            match normalize_cookies(raw) {
                Ok(cookie_list) => {
                    if let Err(e) = capability.add_cookies(cookie_list).await {
                        warn!(session_id = %self.session_id, error = %e, "failed to add cookies");
                    } else {
                        info!(session_id = %self.session_id, "cookies added");
                    }
                }
                Err(e) => warn!(session_id = %self.session_id, error = %e, "failed to normalize cookies"),
            }
        }

        info!(session_id = %self.session_id, url, "navigating");
        capability
            .goto(url, "domcontentloaded", NAVIGATION_TIMEOUT_MS)
            .await
            .map_err(|reason| BrowserError::NavigationError {
                url: url.to_string(),
                reason,
            })?;
        capability
            .wait_for_load_state("networkidle", NETWORKIDLE_TIMEOUT_MS)
            .await
            .ok();

        let is_blank = match capability
            .evaluate("!document.body || document.body.innerText.trim().length === 0")
            .await
        {
            Ok(Value::Bool(b)) => b,
            Ok(_) => false,
            Err(e) => {
                warn!(session_id = %self.session_id, error = %e, "blank-page probe failed, failing open");
                false
            }
        };
        if is_blank {
            return Err(BrowserError::BlankPageError(url.to_string()));
        }
        Ok(())
    }

    /// Hands back a
    /// guard that derefs to the underlying capability for the caller
    /// (webqa-actions, webqa-dom's crawl adapter) to drive directly.
    /// Returns `NotInitialized`/`Closed` if the session isn't ready.
    pub async fn capability(&self) -> Result<CapabilityGuard<'_>, BrowserError> {
        let guard = self.inner.lock().await;
        if guard.closed {
            return Err(BrowserError::Closed);
        }
        if guard.capability.is_none() {
            return Err(BrowserError::NotInitialized);
        }
        Ok(CapabilityGuard(guard))
    }

    /// Snapshot of the page's accumulated network/console signal,
    /// fetched from the capability on demand (there is no separate
    /// monitor object to start/stop here: the capability adapter owns
    /// the listeners for the lifetime of the page). Returns empty
    /// structures if the session isn't initialized rather than erroring,
    /// since this is diagnostic, not load-bearing.
    pub async fn monitoring_snapshot(&self) -> MonitoringSnapshot {
        let guard = self.inner.lock().await;
        let Some(capability) = guard.capability.as_ref() else {
            return MonitoringSnapshot::default();
        };
        MonitoringSnapshot {
            network: capability.network_messages().await,
            console: capability.console_messages().await,
        }
    }

    pub fn is_closed_blocking(&self) -> bool {
        self.inner.try_lock().map(|g| g.closed).unwrap_or(false)
    }

    /// Idempotent: a second `close()` call is a no-op.
    pub async fn close(&self) {
        let mut guard = self.inner.lock().await;
        if guard.closed {
            return;
        }
        info!(session_id = %self.session_id, "closing browser session");
        guard.closed = true;
        if let Some(capability) = guard.capability.take() {
            if let Err(e) = capability.close().await {
                error!(session_id = %self.session_id, error = %e, "error during browser session cleanup");
            }
        }
        info!(session_id = %self.session_id, "browser session closed");
    }
}

/// Holds the session lock for the duration of one capability call, the
/// the same granularity as the session's own lock.
pub struct CapabilityGuard<'a>(tokio::sync::MutexGuard<'a, Inner>);

impl<'a> std::ops::Deref for CapabilityGuard<'a> {
    type Target = dyn BrowserCapability + 'a;

    fn deref(&self) -> &Self::Target {
        self.0.capability.as_deref().expect("checked non-empty in capability()")
    }
}

pub type SharedBrowserSession = Arc<BrowserSession>;

/// Network/console signal captured for one case, attached to
/// `SubTestResult.messages` under the `"network"`/`"console"` keys.
#[derive(Clone, Debug, Default)]
pub struct MonitoringSnapshot {
    pub network: Value,
    pub console: Value,
}
