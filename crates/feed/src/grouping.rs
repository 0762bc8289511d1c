use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use crate::format;
use crate::model::{NotificationId, NotificationKind, NotificationRecord};

const UNKNOWN_SUBJECT: &str = "unknown";

/// Identity of a feed row.
///
/// Renders as `followed`, `{kind}_{thing_id}` or the bare record id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKey {
    /// Every follow merges into one row regardless of actor.
    Followed,
    /// Per-thing rows for `rec_given`, `comment` and `tagged`.
    Subject {
        kind: NotificationKind,
        thing_id: String,
    },
    /// Kinds without a natural subject never merge.
    Single(NotificationId),
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Followed => f.write_str("followed"),
            GroupKey::Subject { kind, thing_id } => write!(f, "{kind}_{thing_id}"),
            GroupKey::Single(id) => write!(f, "{id}"),
        }
    }
}

pub fn group_key(record: &NotificationRecord) -> GroupKey {
    match record.kind {
        NotificationKind::Followed => GroupKey::Followed,
        NotificationKind::RecGiven | NotificationKind::Comment | NotificationKind::Tagged => {
            let thing_id = record
                .data
                .thing_id
                .as_deref()
                .filter(|id| !id.is_empty())
                .unwrap_or(UNKNOWN_SUBJECT);
            GroupKey::Subject {
                kind: record.kind,
                thing_id: thing_id.to_string(),
            }
        }
        NotificationKind::PostLiked | NotificationKind::Other => GroupKey::Single(record.id.clone()),
    }
}

/// Newest first; equal timestamps fall back to the larger id first.
pub fn newest_first(a: &NotificationRecord, b: &NotificationRecord) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

/// A feed row: every record sharing one [`GroupKey`], newest first.
///
/// Derived on every grouping pass and never persisted. Always non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationGroup {
    key: GroupKey,
    members: Vec<NotificationRecord>,
}

impl NotificationGroup {
    pub fn key(&self) -> &GroupKey {
        &self.key
    }

    pub fn members(&self) -> &[NotificationRecord] {
        &self.members
    }

    pub fn most_recent(&self) -> &NotificationRecord {
        &self.members[0]
    }

    pub fn kind(&self) -> NotificationKind {
        self.most_recent().kind
    }

    pub fn total_count(&self) -> usize {
        self.members.len()
    }

    pub fn unread_count(&self) -> usize {
        self.members.iter().filter(|r| !r.read).count()
    }

    pub fn has_unread(&self) -> bool {
        self.members.iter().any(|r| !r.read)
    }

    pub fn unread_ids(&self) -> Vec<NotificationId> {
        self.members
            .iter()
            .filter(|r| !r.read)
            .map(|r| r.id.clone())
            .collect()
    }

    /// Display summary for this row.
    pub fn message(&self) -> String {
        format::format(self)
    }
}

/// Partitions `records` into feed rows ordered by their newest member.
pub fn group(records: &[NotificationRecord]) -> Vec<NotificationGroup> {
    let mut partitions: HashMap<GroupKey, Vec<NotificationRecord>> = HashMap::new();
    for record in records {
        partitions
            .entry(group_key(record))
            .or_default()
            .push(record.clone());
    }

    let mut groups: Vec<NotificationGroup> = partitions
        .into_iter()
        .map(|(key, mut members)| {
            members.sort_by(newest_first);
            NotificationGroup { key, members }
        })
        .collect();

    groups.sort_by(|a, b| {
        newest_first(a.most_recent(), b.most_recent()).then_with(|| a.key.cmp(&b.key))
    });
    groups
}

pub fn flatten_members(groups: &[NotificationGroup]) -> Vec<NotificationRecord> {
    groups
        .iter()
        .flat_map(|g| g.members.iter().cloned())
        .collect()
}
