use mongodb::{Client, Database, options::ClientOptions};
use recfeed_config::Settings;
use tracing::info;

use crate::indexes::ensure_indexes;

/// Opens the configured database and makes sure the feed indexes exist.
pub async fn connect(settings: &Settings) -> Result<Database, mongodb::error::Error> {
    let db = &settings.database;
    let mut options = ClientOptions::parse(&db.url).await?;
    options.app_name = Some(settings.app.name.clone());
    options.max_pool_size = db.max_pool_size.or(options.max_pool_size);
    options.min_pool_size = db.min_pool_size.or(options.min_pool_size);

    let client = Client::with_options(options)?;
    client
        .database("admin")
        .run_command(bson::doc! { "ping": 1 })
        .await?;

    let database = client.database(&db.name);
    ensure_indexes(&database).await?;

    info!(db = %db.name, app = %settings.app.name, "Connected to MongoDB");
    Ok(database)
}
