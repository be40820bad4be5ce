//! Session Manager: creates, indexes, lists, and tears down
//! browser sessions concurrently, guarded by a single map-level lock.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::info;
use webqa_session::BrowserConfig;

use crate::capability::BrowserLauncher;
use crate::errors::BrowserError;
use crate::session::BrowserSession;

#[derive(Default)]
pub struct SessionManager {
    sessions: DashMap<String, Arc<BrowserSession>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and initializes a new session, indexing it by
    /// `session_id`. The map mutation itself is a single `DashMap`
    /// insert.
    pub async fn create_session(
        &self,
        browser_config: BrowserConfig,
        launcher: &dyn BrowserLauncher,
    ) -> Result<Arc<BrowserSession>, BrowserError> {
        let session = Arc::new(BrowserSession::new(browser_config));
        session.initialize(launcher).await?;
        self.sessions
            .insert(session.session_id.clone(), session.clone());
        info!(session_id = %session.session_id, "created browser session");
        Ok(session)
    }

    pub fn get_session(&self, session_id: &str) -> Option<Arc<BrowserSession>> {
        self.sessions.get(session_id).map(|e| e.value().clone())
    }

    pub async fn close_session(&self, session_id: &str) {
        if let Some((_, session)) = self.sessions.remove(session_id) {
            session.close().await;
            info!(session_id, "closed browser session");
        }
    }

    /// Closes every known session concurrently, matching the source's
    /// `asyncio.gather(..., return_exceptions=True)` fan-out.
    pub async fn close_all_sessions(&self) {
        let sessions: Vec<Arc<BrowserSession>> =
            self.sessions.iter().map(|e| e.value().clone()).collect();
        self.sessions.clear();
        if sessions.is_empty() {
            return;
        }
        let count = sessions.len();
        let mut joins = tokio::task::JoinSet::new();
        for session in sessions {
            joins.spawn(async move { session.close().await });
        }
        while joins.join_next().await.is_some() {}
        info!(count, "closed all browser sessions");
    }

    pub fn list_session_ids(&self) -> Vec<String> {
        self.sessions.iter().map(|e| e.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
