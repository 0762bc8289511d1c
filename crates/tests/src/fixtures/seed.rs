use bson::{DateTime, oid::ObjectId};
use recfeed_db::models::{Notification, NotificationData, NotificationType};
use recfeed_services::dao::notification::NewNotification;

use super::test_db::TestDb;

pub struct SeededUser {
    pub id: ObjectId,
    pub name: String,
}

impl SeededUser {
    pub fn new(name: &str) -> Self {
        Self {
            id: ObjectId::new(),
            name: name.to_string(),
        }
    }
}

/// Base timestamp for seeded notifications, so ordering is explicit.
const EPOCH_MS: i64 = 1_700_000_000_000;

impl TestDb {
    /// Insert a notification for `recipient` created `offset_secs` after the base time.
    pub async fn seed_notification(
        &self,
        recipient: &SeededUser,
        notification_type: NotificationType,
        actor: Option<&SeededUser>,
        thing: Option<(&str, &str)>,
        offset_secs: i64,
    ) -> Notification {
        let data = NotificationData {
            thing_id: thing.map(|(id, _)| id.to_string()),
            thing_title: thing.map(|(_, title)| title.to_string()),
            from_user_id: actor.map(|a| a.id.to_hex()),
            from_user_name: actor.map(|a| a.name.clone()),
            ..NotificationData::default()
        };

        self.seed_with_data(recipient, notification_type, data, offset_secs)
            .await
    }

    pub async fn seed_with_data(
        &self,
        recipient: &SeededUser,
        notification_type: NotificationType,
        data: NotificationData,
        offset_secs: i64,
    ) -> Notification {
        let message = match &data.from_user_name {
            Some(name) => format!("{name} did something"),
            None => "Something happened".to_string(),
        };

        self.store
            .notifications
            .create(NewNotification {
                user_id: recipient.id,
                notification_type,
                title: "Activity".to_string(),
                message,
                data,
                created_at: Some(DateTime::from_millis(EPOCH_MS + offset_secs * 1000)),
            })
            .await
            .expect("Failed to seed notification")
    }

    /// Seed `count` follow notifications from distinct actors, oldest first.
    pub async fn seed_followers(&self, recipient: &SeededUser, count: usize) -> Vec<SeededUser> {
        let mut actors = Vec::with_capacity(count);
        for i in 0..count {
            let actor = SeededUser::new(&format!("Follower{i}"));
            self.seed_notification(
                recipient,
                NotificationType::Followed,
                Some(&actor),
                None,
                i as i64,
            )
            .await;
            actors.push(actor);
        }
        actors
    }
}
