use bson::{DateTime, doc, oid::ObjectId};
use mongodb::Database;
use recfeed_db::models::{Tag, TagStatus};

use super::base::{BaseDao, DaoError, DaoResult};

pub struct TagDao {
    pub base: BaseDao<Tag>,
}

impl TagDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Tag::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        thing_id: String,
        thing_title: Option<String>,
        from_user_id: ObjectId,
        from_user_name: Option<String>,
        recipient_id: ObjectId,
    ) -> DaoResult<Tag> {
        let tag = Tag {
            id: None,
            thing_id,
            thing_title,
            from_user_id,
            from_user_name,
            recipient_id,
            status: TagStatus::Pending,
            created_at: DateTime::now(),
        };

        let id = self.base.insert_one(&tag).await?;
        self.base.find_by_id(id).await
    }

    /// Answered tags are treated as gone.
    pub async fn find_pending(&self, id: ObjectId) -> DaoResult<Tag> {
        self.base
            .find_one(doc! { "_id": id, "status": "pending" })
            .await?
            .ok_or(DaoError::NotFound)
    }

    /// Records the recipient's answer. Returns `false` if it was already answered.
    pub async fn respond(&self, id: ObjectId, accept: bool) -> DaoResult<bool> {
        let status = if accept {
            TagStatus::Accepted
        } else {
            TagStatus::Declined
        };
        self.base
            .update_one(
                doc! { "_id": id, "status": "pending" },
                doc! { "$set": { "status": bson::to_bson(&status)? } },
            )
            .await
    }
}
