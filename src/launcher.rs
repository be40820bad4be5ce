//! Wires a concrete `BrowserLauncher` for the CLI/queue boundary.
//!
//! The real browser automation library (Playwright-over-CDP or
//! equivalent) is an external collaborator this crate deliberately
//! never implements (see `webqa-browser`'s own `capability.rs`).
//! Until one is plugged in, the engine runs against
//! `webqa_browser::test_support::MockLauncher` so the CLI is runnable
//! end-to-end; swap `default_launcher` for a real adapter to drive an
//! actual browser.
use std::sync::Arc;

use webqa_browser::{test_support::MockLauncher, BrowserLauncher};

pub fn default_launcher() -> Arc<dyn BrowserLauncher> {
    Arc::new(MockLauncher)
}
