use std::sync::{Arc, Once};

use mongodb::Database;
use recfeed_config::Settings;
use recfeed_feed::{FeedConfig, FeedSession, FeedSignal, UserId};
use recfeed_services::MongoNotificationStore;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "recfeed_feed=debug,recfeed_services=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
    });
}

/// A fresh MongoDB database plus the store built on top of it.
pub struct TestDb {
    pub db: Database,
    pub settings: Settings,
    pub store: Arc<MongoNotificationStore>,
}

impl TestDb {
    /// Connects to the test MongoDB and creates an isolated database.
    ///
    /// Requires a running MongoDB at localhost:27017.
    /// Set RECFEED__DATABASE__URL to override the connection string.
    pub async fn spawn() -> Self {
        dotenvy::dotenv().ok();
        init_tracing();

        let db_name = format!("recfeed_test_{}", uuid::Uuid::new_v4().simple());

        let mut settings = Settings::load().unwrap_or_else(|_| test_settings());
        if let Ok(url) = std::env::var("RECFEED__DATABASE__URL") {
            settings.database.url = url;
        }
        settings.database.name = db_name;

        let db = recfeed_db::connect(&settings)
            .await
            .expect("Failed to connect to MongoDB");

        let store = Arc::new(MongoNotificationStore::new(&db));

        Self { db, settings, store }
    }

    /// A feed session for `user_id` using the configured feed settings,
    /// with the page size overridden.
    pub fn session(
        &self,
        user_id: &bson::oid::ObjectId,
        page_size: u64,
    ) -> (Arc<FeedSession>, broadcast::Receiver<FeedSignal>) {
        let mut config = FeedConfig::from(&self.settings.feed);
        config.page_size = page_size;
        FeedSession::new(self.store.clone(), UserId::new(user_id.to_hex()), config)
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        let db = self.db.clone();
        // Best effort cleanup: drop the test database
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let _ = db.drop().await;
            });
        }
    }
}

fn test_settings() -> Settings {
    Settings {
        app: recfeed_config::AppSettings {
            name: "recfeed".to_string(),
            environment: "test".to_string(),
        },
        database: recfeed_config::DatabaseSettings {
            url: "mongodb://localhost:27017".to_string(),
            name: "recfeed_test".to_string(),
            max_pool_size: Some(5),
            min_pool_size: Some(1),
        },
        feed: recfeed_config::FeedSettings {
            page_size: 25,
            refresh_threshold: 60.0,
            scroll_lookahead: 100.0,
            signal_capacity: 64,
        },
    }
}
