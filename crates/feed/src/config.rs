use recfeed_config::FeedSettings;
use serde::{Deserialize, Serialize};

/// Configuration for a feed session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Records requested per page.
    pub page_size: u64,
    /// Pull distance (in scroll units) that arms a refresh on release.
    pub refresh_threshold: f64,
    /// Remaining distance to the bottom at which the next page loads.
    pub scroll_lookahead: f64,
    /// Capacity of the signal broadcast channel.
    pub signal_capacity: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: 25,
            refresh_threshold: 60.0,
            scroll_lookahead: 100.0,
            signal_capacity: 64,
        }
    }
}

impl From<&FeedSettings> for FeedConfig {
    fn from(settings: &FeedSettings) -> Self {
        Self {
            page_size: settings.page_size,
            refresh_threshold: settings.refresh_threshold,
            scroll_lookahead: settings.scroll_lookahead,
            signal_capacity: settings.signal_capacity,
        }
    }
}
