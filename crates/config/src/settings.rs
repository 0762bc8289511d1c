use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub feed: FeedSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub name: String,
    pub max_pool_size: Option<u32>,
    pub min_pool_size: Option<u32>,
}

/// Tuning knobs for the notification feed session.
#[derive(Debug, Deserialize, Clone)]
pub struct FeedSettings {
    /// Records requested per page from the notification store.
    pub page_size: u64,
    /// Pull distance that arms a refresh on release.
    pub refresh_threshold: f64,
    /// Remaining scroll distance at which the next page is requested.
    pub scroll_lookahead: f64,
    /// Capacity of the broadcast channel carrying feed signals.
    pub signal_capacity: usize,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("RECFEED"),
            )
            .set_default("app.name", "recfeed")?
            .set_default("app.environment", "development")?
            .set_default("database.url", "mongodb://localhost:27017")?
            .set_default("database.name", "recfeed")?
            .set_default("feed.page_size", 25)?
            .set_default("feed.refresh_threshold", 60.0)?
            .set_default("feed.scroll_lookahead", 100.0)?
            .set_default("feed.signal_capacity", 64)?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::load().expect("Failed to load default settings")
    }
}
