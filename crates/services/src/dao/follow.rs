use bson::{DateTime, doc, oid::ObjectId};
use mongodb::Database;
use recfeed_db::models::Follow;
use tracing::debug;

use super::base::{BaseDao, DaoError, DaoResult};

pub struct FollowDao {
    pub base: BaseDao<Follow>,
}

impl FollowDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Follow::COLLECTION),
        }
    }

    /// Returns `false` when the follow already existed.
    pub async fn follow(&self, follower_id: ObjectId, followee_id: ObjectId) -> DaoResult<bool> {
        if follower_id == followee_id {
            return Err(DaoError::Validation("Cannot follow yourself".to_string()));
        }

        let follow = Follow {
            id: None,
            follower_id,
            followee_id,
            created_at: DateTime::now(),
        };

        match self.base.insert_one(&follow).await {
            Ok(_) => Ok(true),
            Err(DaoError::DuplicateKey(_)) => {
                debug!(%follower_id, %followee_id, "Already following");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn is_following(&self, follower_id: ObjectId, followee_id: ObjectId) -> DaoResult<bool> {
        Ok(self
            .base
            .find_one(doc! { "follower_id": follower_id, "followee_id": followee_id })
            .await?
            .is_some())
    }
}
