//! The out-of-scope browser automation surface.
//!
//! The underlying browser automation library is treated as an external
//! collaborator ("page.click, page.goto, page.screenshot,
//! context.addCookies, ..."), never reimplemented here.
//! `BrowserCapability` is that contract, narrowed to what the session and
//! action handler actually call. A concrete adapter (Playwright-over-CDP,
//! or a mock for tests) implements it; this crate never does.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::BrowserError;

/// One browser tab/page plus its context, as a mockable capability
/// surface. All methods that can fail for "this isn't possible right
/// now" reasons (element not found, evaluate threw) return a `Result`
/// rather than panicking; `BrowserError` is reserved for the session
/// lifecycle operations that legitimately need to propagate.
#[async_trait]
pub trait BrowserCapability: Send + Sync {
    /// Navigates the page. `wait_until` is passed through verbatim
    /// ("domcontentloaded", "load", "networkidle", ...).
    async fn goto(&self, url: &str, wait_until: &str, timeout_ms: u64) -> Result<(), String>;

    async fn wait_for_load_state(&self, state: &str, timeout_ms: u64) -> Result<(), String>;

    /// Runs arbitrary page-side JavaScript and returns its JSON-encoded
    /// result. Used both for the blank-page probe and the DOM crawl.
    async fn evaluate(&self, script: &str) -> Result<Value, String>;

    async fn add_cookies(&self, cookies: Vec<Value>) -> Result<(), String>;

    async fn current_url(&self) -> String;

    async fn screenshot(&self, full_page: bool, timeout_ms: u64) -> Result<Vec<u8>, String>;

    async fn mouse_click(&self, x: f64, y: f64) -> Result<(), String>;

    async fn mouse_move(&self, x: f64, y: f64) -> Result<(), String>;

    async fn mouse_down(&self) -> Result<(), String>;

    async fn mouse_up(&self) -> Result<(), String>;

    async fn keyboard_press(&self, key: &str) -> Result<(), String>;

    /// `locator(selector).fill(text)`. The caller is responsible for the
    /// CSS-then-XPath fallback; this is the raw primitive for one
    /// locator kind at a time.
    async fn fill_css(&self, selector: &str, text: &str) -> Result<(), String>;

    async fn fill_xpath(&self, xpath: &str, text: &str) -> Result<(), String>;

    async fn set_input_files(&self, selector: &str, paths: Vec<String>) -> Result<(), String>;

    /// Number of pages currently open in this page's context, used by
    /// `get_new_page` to detect a freshly opened tab.
    async fn context_page_count(&self) -> usize;

    /// Switches this capability's focus to the newest page in its
    /// context (e.g. after a `target=_blank` click slipped through).
    async fn switch_to_newest_page(&self) -> Result<(), String>;

    async fn scroll_by(&self, dx: f64, dy: f64) -> Result<(), String>;

    async fn scroll_position(&self) -> Result<(f64, f64), String>;

    async fn viewport_inner_height(&self) -> Result<f64, String>;

    async fn go_back(&self) -> Result<(), String>;

    /// Accumulated network responses/failures since the page started
    /// listening, shaped as `{"responses": [...], "failed_requests": [...]}`.
    /// Adapters that don't wire a response listener may leave this at its
    /// default (empty arrays); the aggregator treats that as "no signal"
    /// rather than an error.
    async fn network_messages(&self) -> Value {
        serde_json::json!({"responses": [], "failed_requests": []})
    }

    /// Accumulated `console.error`/`console.warning` entries since the
    /// page started listening.
    async fn console_messages(&self) -> Value {
        serde_json::json!([])
    }

    async fn close(&self) -> Result<(), String>;
}

/// Factory for a `BrowserCapability`, parameterized over the
/// viewport/headless/locale knobs in `webqa_session::BrowserConfig`.
/// Launches a fresh
/// browser + context + page per call.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(
        &self,
        config: &webqa_session::BrowserConfig,
    ) -> Result<Box<dyn BrowserCapability>, BrowserError>;
}
