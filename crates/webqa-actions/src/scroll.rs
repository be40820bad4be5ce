//! `scroll`: validated direction/scrollType/distance, with
//! no-progress termination for the `untilBottom`/`untilTop` loops.

use std::time::Duration;

use webqa_browser::BrowserCapability;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollType {
    Once,
    UntilBottom,
    UntilTop,
}

impl ScrollType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "once" => Some(ScrollType::Once),
            "untilBottom" => Some(ScrollType::UntilBottom),
            "untilTop" => Some(ScrollType::UntilTop),
            _ => None,
        }
    }
}

/// Scrolls the page. Returns `false` (never raises) on invalid inputs,
/// logging the reason instead.
pub async fn scroll(
    capability: &dyn BrowserCapability,
    direction: &str,
    scroll_type: &str,
    distance: Option<i64>,
) -> bool {
    let Some(direction) = Direction::parse(direction) else {
        tracing::error!(direction, "invalid scroll direction");
        return false;
    };
    let Some(scroll_type) = ScrollType::parse(scroll_type) else {
        tracing::error!(scroll_type, "invalid scroll type");
        return false;
    };
    if let Some(d) = distance {
        if d < 0 {
            tracing::error!(distance = d, "invalid scroll distance");
            return false;
        }
    }

    let mut distance = match distance {
        Some(d) => d as f64,
        None => match capability.viewport_inner_height().await {
            Ok(h) => h / 2.0,
            Err(e) => {
                tracing::error!(error = %e, "failed to read viewport height");
                return false;
            }
        },
    };

    let signed = |d: f64| match direction {
        Direction::Down => d,
        Direction::Up => -d,
    };

    match scroll_type {
        ScrollType::Once => {
            capability.scroll_by(0.0, signed(distance)).await.ok();
            true
        }
        ScrollType::UntilBottom => {
            let mut prev_scroll = -1.0;
            loop {
                let (_, current_scroll) = capability.scroll_position().await.unwrap_or((0.0, 0.0));
                if current_scroll == prev_scroll {
                    break;
                }
                // No document height probe is exposed on the capability
                // surface beyond scroll_position/viewport height, so we
                // rely purely on no-progress detection here: stop once
                // two consecutive scroll attempts land at the same
                // position.
                prev_scroll = current_scroll;
                capability.scroll_by(0.0, distance).await.ok();
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
            true
        }
        ScrollType::UntilTop => {
            let mut prev_scroll = -1.0;
            loop {
                let (_, current_scroll) = capability.scroll_position().await.unwrap_or((0.0, 0.0));
                if current_scroll <= 0.0 || current_scroll == prev_scroll {
                    break;
                }
                if current_scroll - distance <= 0.0 {
                    distance = current_scroll;
                }
                prev_scroll = current_scroll;
                capability.scroll_by(0.0, -distance).await.ok();
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
            true
        }
    }
}
