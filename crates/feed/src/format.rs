use crate::grouping::NotificationGroup;
use crate::model::{NotificationRecord, Payload, Thing};

const DEFAULT_THING_TITLE: &str = "an item";

/// Summary line for a feed row.
///
/// Single-member rows keep the producer's message. Larger rows are rebuilt
/// from their distinct actor names; anything that cannot be described falls
/// back to the newest member's message.
pub fn format(group: &NotificationGroup) -> String {
    let latest = group.most_recent();
    if group.total_count() == 1 {
        return latest.message.clone();
    }

    let Some(verb) = verb_phrase(&latest.payload()) else {
        return latest.message.clone();
    };

    let names = distinct_actor_names(group.members());
    match names.as_slice() {
        [] => latest.message.clone(),
        [only] => format!("{only} {verb}"),
        [first, second] => format!("{first} and {second} {verb}"),
        [first, second, rest @ ..] => {
            format!("{first}, {second}, and {} others {verb}", rest.len())
        }
    }
}

/// What the actors did, or `None` for kinds that are never summarised.
pub fn verb_phrase(payload: &Payload<'_>) -> Option<String> {
    let title = |thing: Thing<'_>| thing.title.unwrap_or(DEFAULT_THING_TITLE).to_string();

    match *payload {
        Payload::Followed { .. } => Some("started following you".to_string()),
        Payload::RecGiven { thing, .. } => Some(format!("completed \"{}\"", title(thing))),
        Payload::Comment { thing, .. } => Some(format!("commented on \"{}\"", title(thing))),
        Payload::Tagged { thing, .. } => Some(format!("tagged you in \"{}\"", title(thing))),
        Payload::PostLiked { .. } | Payload::Other { .. } => None,
    }
}

/// Non-empty actor names in first-seen order, without repeats.
fn distinct_actor_names(members: &[NotificationRecord]) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for member in members {
        if let Some(name) = member.data.from_user_name.as_deref() {
            if !name.is_empty() && !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}
