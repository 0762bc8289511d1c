use async_trait::async_trait;

use crate::error::FeedResult;
use crate::model::{Cursor, NotificationId, Page, Tag, TagId, UserId};

/// The document store as seen by the feed.
///
/// Every method is a suspension point; failures come back as
/// `FeedError::StoreUnavailable` unless stated otherwise.
#[async_trait]
pub trait NotificationStore: Send + Sync + 'static {
    /// Fetches one page of `user_id`'s notifications, newest first.
    /// `cursor = None` requests the first page.
    async fn fetch_notifications(
        &self,
        user_id: &UserId,
        cursor: Option<Cursor>,
        limit: u64,
    ) -> FeedResult<Page>;

    /// Idempotent.
    async fn mark_one_read(&self, id: &NotificationId) -> FeedResult<()>;

    async fn mark_all_read(&self, user_id: &UserId) -> FeedResult<()>;

    async fn follow_user(&self, actor_id: &UserId, target_id: &UserId) -> FeedResult<()>;

    /// Resolves a pending tag. `FeedError::NotFound` when it no longer exists.
    async fn find_tag(&self, tag_id: &TagId) -> FeedResult<Tag>;
}
