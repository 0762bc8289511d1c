use bson::{DateTime, doc, oid::ObjectId};
use mongodb::Database;
use recfeed_db::models::{Notification, NotificationData, NotificationType};
use tracing::debug;

use super::base::{BaseDao, DaoResult, PaginatedResult, PaginationParams};

pub struct NotificationDao {
    pub base: BaseDao<Notification>,
}

/// Fields for a new notification; producers live outside the feed.
pub struct NewNotification {
    pub user_id: ObjectId,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub data: NotificationData,
    pub created_at: Option<DateTime>,
}

impl NotificationDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Notification::COLLECTION),
        }
    }

    pub async fn create(&self, new: NewNotification) -> DaoResult<Notification> {
        let notification = Notification {
            id: None,
            user_id: new.user_id,
            notification_type: new.notification_type,
            read: false,
            read_at: None,
            title: new.title,
            message: new.message,
            data: new.data,
            created_at: new.created_at.unwrap_or_else(DateTime::now),
        };

        let id = self.base.insert_one(&notification).await?;
        self.base.find_by_id(id).await
    }

    /// Newest first; `_id` breaks timestamp ties so pages never reshuffle.
    /// Documents that do not decode are left out of the page.
    pub async fn list_for_user(
        &self,
        user_id: ObjectId,
        params: &PaginationParams,
    ) -> DaoResult<PaginatedResult<Notification>> {
        self.base
            .find_paginated(
                doc! { "user_id": user_id },
                Some(doc! { "created_at": -1, "_id": -1 }),
                params,
            )
            .await
    }

    /// Idempotent: already-read notifications keep their original `read_at`.
    pub async fn mark_read(&self, id: ObjectId) -> DaoResult<bool> {
        let modified = self
            .base
            .update_one(
                doc! { "_id": id, "read": false },
                doc! { "$set": { "read": true, "read_at": DateTime::now() } },
            )
            .await?;
        debug!(%id, modified, "Mark notification read");
        Ok(modified)
    }

    pub async fn mark_all_read(&self, user_id: ObjectId) -> DaoResult<u64> {
        let modified = self
            .base
            .update_many(
                doc! { "user_id": user_id, "read": false },
                doc! { "$set": { "read": true, "read_at": DateTime::now() } },
            )
            .await?;
        debug!(%user_id, modified, "Mark all notifications read");
        Ok(modified)
    }

    pub async fn count_unread(&self, user_id: ObjectId) -> DaoResult<u64> {
        self.base
            .count(doc! { "user_id": user_id, "read": false })
            .await
    }
}
