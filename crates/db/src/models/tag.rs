use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// A pending invitation asking `recipient_id` to add a thing to their list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub thing_id: String,
    pub thing_title: Option<String>,
    pub from_user_id: ObjectId,
    pub from_user_name: Option<String>,
    pub recipient_id: ObjectId,
    #[serde(default)]
    pub status: TagStatus,
    pub created_at: DateTime,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
}

impl Tag {
    pub const COLLECTION: &'static str = "tags";
}
