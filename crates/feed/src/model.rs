use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Opaque store-assigned notification id. Also the final ordering tie-break.
    NotificationId
);
string_id!(UserId);
string_id!(TagId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Tagged,
    RecGiven,
    Comment,
    PostLiked,
    Followed,
    #[serde(other)]
    Other,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Tagged => "tagged",
            NotificationKind::RecGiven => "rec_given",
            NotificationKind::Comment => "comment",
            NotificationKind::PostLiked => "post_liked",
            NotificationKind::Followed => "followed",
            NotificationKind::Other => "other",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cross-references as the producer wrote them. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    pub thing_id: Option<String>,
    pub post_id: Option<String>,
    pub tag_id: Option<TagId>,
    pub from_user_id: Option<UserId>,
    pub from_user_name: Option<String>,
    pub thing_title: Option<String>,
}

/// One per-event notification. Only `read` ever changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub message: String,
    pub data: NotificationData,
}

impl NotificationRecord {
    pub fn new(id: impl Into<NotificationId>, kind: NotificationKind, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            kind,
            read: false,
            created_at,
            title: String::new(),
            message: String::new(),
            data: NotificationData::default(),
        }
    }

    /// Typed view of `data` for this record's kind.
    pub fn payload(&self) -> Payload<'_> {
        let data = &self.data;
        let actor = Actor {
            id: data.from_user_id.as_ref(),
            name: non_empty(data.from_user_name.as_deref()),
        };
        let thing = Thing {
            id: non_empty(data.thing_id.as_deref()),
            title: non_empty(data.thing_title.as_deref()),
        };
        let post_id = non_empty(data.post_id.as_deref());

        match self.kind {
            NotificationKind::Tagged => Payload::Tagged {
                thing,
                tag_id: data.tag_id.as_ref().filter(|t| !t.as_str().is_empty()),
                actor,
            },
            NotificationKind::RecGiven => Payload::RecGiven { thing, post_id, actor },
            NotificationKind::Comment => Payload::Comment { thing, post_id, actor },
            NotificationKind::PostLiked => Payload::PostLiked { thing, post_id, actor },
            NotificationKind::Followed => Payload::Followed { actor },
            NotificationKind::Other => Payload::Other { thing, post_id, actor },
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Actor<'a> {
    pub id: Option<&'a UserId>,
    pub name: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Thing<'a> {
    pub id: Option<&'a str>,
    pub title: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload<'a> {
    Tagged {
        thing: Thing<'a>,
        tag_id: Option<&'a TagId>,
        actor: Actor<'a>,
    },
    RecGiven {
        thing: Thing<'a>,
        post_id: Option<&'a str>,
        actor: Actor<'a>,
    },
    Comment {
        thing: Thing<'a>,
        post_id: Option<&'a str>,
        actor: Actor<'a>,
    },
    PostLiked {
        thing: Thing<'a>,
        post_id: Option<&'a str>,
        actor: Actor<'a>,
    },
    Followed {
        actor: Actor<'a>,
    },
    Other {
        thing: Thing<'a>,
        post_id: Option<&'a str>,
        actor: Actor<'a>,
    },
}

impl<'a> Payload<'a> {
    pub fn actor(&self) -> Actor<'a> {
        match *self {
            Payload::Tagged { actor, .. }
            | Payload::RecGiven { actor, .. }
            | Payload::Comment { actor, .. }
            | Payload::PostLiked { actor, .. }
            | Payload::Followed { actor }
            | Payload::Other { actor, .. } => actor,
        }
    }

    pub fn thing(&self) -> Option<Thing<'a>> {
        match *self {
            Payload::Tagged { thing, .. }
            | Payload::RecGiven { thing, .. }
            | Payload::Comment { thing, .. }
            | Payload::PostLiked { thing, .. }
            | Payload::Other { thing, .. } => Some(thing),
            Payload::Followed { .. } => None,
        }
    }

    /// Where opening this notification should take the user: the feed post
    /// when one is referenced, otherwise the thing itself.
    pub fn subject(&self) -> Option<Subject> {
        let post_id = match *self {
            Payload::RecGiven { post_id, .. }
            | Payload::Comment { post_id, .. }
            | Payload::PostLiked { post_id, .. }
            | Payload::Other { post_id, .. } => post_id,
            Payload::Tagged { .. } | Payload::Followed { .. } => None,
        };

        post_id
            .map(|id| Subject::Post(id.to_string()))
            .or_else(|| {
                self.thing()
                    .and_then(|thing| thing.id)
                    .map(|id| Subject::Thing(id.to_string()))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Subject {
    Post(String),
    Thing(String),
}

/// Store-defined position of the next page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor(pub u64);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub records: Vec<NotificationRecord>,
    /// `None` once the store has nothing further.
    pub next_cursor: Option<Cursor>,
}

/// A pending tag invitation, resolved when a tagged notification is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub thing_id: String,
    pub thing_title: Option<String>,
    pub from_user_id: UserId,
    pub from_user_name: Option<String>,
}
