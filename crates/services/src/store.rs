use async_trait::async_trait;
use bson::oid::ObjectId;
use mongodb::Database;
use recfeed_db::models::{Notification, NotificationType, Tag as TagDoc};
use recfeed_feed::{
    Cursor, FeedError, FeedResult, NotificationData, NotificationId, NotificationKind,
    NotificationRecord, NotificationStore, Page, Tag, TagId, UserId,
};
use tracing::{debug, warn};

use crate::dao::base::{DaoError, PaginationParams, parse_object_id};
use crate::dao::{FollowDao, NotificationDao, TagDao};

/// [`NotificationStore`] backed by the MongoDB collections.
pub struct MongoNotificationStore {
    pub notifications: NotificationDao,
    pub follows: FollowDao,
    pub tags: TagDao,
}

impl MongoNotificationStore {
    pub fn new(db: &Database) -> Self {
        Self {
            notifications: NotificationDao::new(db),
            follows: FollowDao::new(db),
            tags: TagDao::new(db),
        }
    }

    /// Unread badge count straight from the store, without loading a page.
    pub async fn count_unread(&self, user_id: &UserId) -> FeedResult<u64> {
        let user_id = object_id(user_id.as_str())?;
        self.notifications
            .count_unread(user_id)
            .await
            .map_err(store_error)
    }
}

#[async_trait]
impl NotificationStore for MongoNotificationStore {
    async fn fetch_notifications(
        &self,
        user_id: &UserId,
        cursor: Option<Cursor>,
        limit: u64,
    ) -> FeedResult<Page> {
        let user = object_id(user_id.as_str())?;
        let params = PaginationParams {
            page: cursor.map_or(1, |c| c.0),
            per_page: limit,
        };

        let result = self
            .notifications
            .list_for_user(user, &params)
            .await
            .map_err(store_error)?;
        let next_cursor = result.next_page().map(Cursor);

        let mut records = Vec::with_capacity(result.items.len());
        for doc in result.items {
            match to_record(doc) {
                Ok(record) => records.push(record),
                Err(e) => warn!(%user_id, error = %e, "Skipping notification"),
            }
        }

        debug!(%user_id, page = params.page, count = records.len(), "Fetched notifications");
        Ok(Page {
            records,
            next_cursor,
        })
    }

    async fn mark_one_read(&self, id: &NotificationId) -> FeedResult<()> {
        let id = object_id(id.as_str())?;
        self.notifications
            .mark_read(id)
            .await
            .map(|_| ())
            .map_err(store_error)
    }

    async fn mark_all_read(&self, user_id: &UserId) -> FeedResult<()> {
        let user_id = object_id(user_id.as_str())?;
        self.notifications
            .mark_all_read(user_id)
            .await
            .map(|_| ())
            .map_err(store_error)
    }

    async fn follow_user(&self, actor_id: &UserId, target_id: &UserId) -> FeedResult<()> {
        let actor = object_id(actor_id.as_str())?;
        let target = object_id(target_id.as_str())?;
        self.follows
            .follow(actor, target)
            .await
            .map(|_| ())
            .map_err(store_error)
    }

    async fn find_tag(&self, tag_id: &TagId) -> FeedResult<Tag> {
        let id = object_id(tag_id.as_str())?;
        let doc = self.tags.find_pending(id).await.map_err(|e| match e {
            DaoError::NotFound => FeedError::NotFound(format!("tag {tag_id}")),
            other => store_error(other),
        })?;
        Ok(to_tag(doc, tag_id))
    }
}

fn object_id(raw: &str) -> FeedResult<ObjectId> {
    parse_object_id(raw).map_err(|_| FeedError::NotFound(format!("no document with id {raw}")))
}

fn store_error(err: DaoError) -> FeedError {
    match err {
        DaoError::NotFound => FeedError::NotFound("document".to_string()),
        other => FeedError::StoreUnavailable(other.to_string()),
    }
}

fn to_record(doc: Notification) -> FeedResult<NotificationRecord> {
    let id = doc
        .id
        .ok_or_else(|| FeedError::MalformedRecord("notification without _id".to_string()))?;

    let data = doc.data;
    Ok(NotificationRecord {
        id: NotificationId::new(id.to_hex()),
        kind: to_kind(doc.notification_type),
        read: doc.read,
        created_at: doc.created_at.to_chrono(),
        title: doc.title,
        message: doc.message,
        data: NotificationData {
            thing_id: data.thing_id,
            post_id: data.post_id,
            tag_id: data.tag_id.map(TagId::from),
            from_user_id: data.from_user_id.map(UserId::from),
            from_user_name: data.from_user_name,
            thing_title: data.thing_title,
        },
    })
}

fn to_kind(notification_type: NotificationType) -> NotificationKind {
    match notification_type {
        NotificationType::Tagged => NotificationKind::Tagged,
        NotificationType::RecGiven => NotificationKind::RecGiven,
        NotificationType::Comment => NotificationKind::Comment,
        NotificationType::PostLiked => NotificationKind::PostLiked,
        NotificationType::Followed => NotificationKind::Followed,
        NotificationType::Other => NotificationKind::Other,
    }
}

fn to_tag(doc: TagDoc, requested: &TagId) -> Tag {
    Tag {
        id: doc
            .id
            .map(|id| TagId::new(id.to_hex()))
            .unwrap_or_else(|| requested.clone()),
        thing_id: doc.thing_id,
        thing_title: doc.thing_title,
        from_user_id: UserId::new(doc.from_user_id.to_hex()),
        from_user_name: doc.from_user_name,
    }
}
