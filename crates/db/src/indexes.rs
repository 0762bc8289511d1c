use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

use crate::models::{Follow, Notification, Tag};

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Notifications: feed pages are read newest first with _id as tie-break
    create_indexes(
        db,
        Notification::COLLECTION,
        vec![
            index(bson::doc! { "user_id": 1, "created_at": -1, "_id": -1 }),
            index(bson::doc! { "user_id": 1, "read": 1 }),
        ],
    )
    .await?;

    // Follows
    create_indexes(
        db,
        Follow::COLLECTION,
        vec![
            index_unique(bson::doc! { "follower_id": 1, "followee_id": 1 }),
            index(bson::doc! { "followee_id": 1 }),
        ],
    )
    .await?;

    // Tags
    create_indexes(
        db,
        Tag::COLLECTION,
        vec![index(bson::doc! { "recipient_id": 1, "status": 1 })],
    )
    .await?;

    info!("All indexes ensured");
    Ok(())
}

fn index(keys: bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

fn index_unique(keys: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    db.collection::<bson::Document>(collection)
        .create_indexes(indexes)
        .await?;
    info!(collection, "Indexes created");
    Ok(())
}
