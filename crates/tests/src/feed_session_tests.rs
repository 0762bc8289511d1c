use recfeed_db::models::{NotificationData, NotificationType};
use recfeed_feed::{
    Activation, FeedSignal, GroupAction, Haptic, LoadOutcome, Phase, ScrollMetrics, Subject,
    TagId,
};

use crate::fixtures::seed::SeededUser;
use crate::fixtures::test_db::TestDb;

const NEAR_BOTTOM: ScrollMetrics = ScrollMetrics {
    offset: 1400.0,
    viewport_height: 600.0,
    content_height: 2000.0,
};

#[tokio::test]
async fn load_groups_and_formats_mongo_records() {
    let t = TestDb::spawn().await;
    let me = SeededUser::new("Me");
    let ann = SeededUser::new("Ann");
    let bo = SeededUser::new("Bo");

    t.seed_followers(&me, 3).await;
    t.seed_notification(&me, NotificationType::Comment, Some(&ann), Some(("t1", "Tacos")), 10)
        .await;
    t.seed_notification(&me, NotificationType::Comment, Some(&bo), Some(("t1", "Tacos")), 11)
        .await;
    t.seed_notification(&me, NotificationType::Tagged, Some(&ann), Some(("t1", "Tacos")), 12)
        .await;

    let (session, _rx) = t.session(&me.id, 25);
    assert_eq!(session.load().await, LoadOutcome::Applied { records: 6 });
    assert_eq!(session.phase(), Phase::Ready);
    assert_eq!(session.unread_total(), 6);

    let groups = session.groups();
    let keys: Vec<String> = groups.iter().map(|g| g.key().to_string()).collect();
    assert_eq!(keys, vec!["tagged_t1", "comment_t1", "followed"]);

    assert_eq!(groups[0].message(), "Ann did something");
    assert_eq!(groups[1].message(), "Bo and Ann commented on \"Tacos\"");
    assert_eq!(
        groups[2].message(),
        "Follower2, Follower1, and 1 others started following you"
    );
}

#[tokio::test]
async fn activating_group_persists_read_state() {
    let t = TestDb::spawn().await;
    let me = SeededUser::new("Me");
    t.seed_followers(&me, 2).await;
    t.seed_notification(&me, NotificationType::RecGiven, None, Some(("t9", "Dune")), 10)
        .await;

    let (session, mut rx) = t.session(&me.id, 25);
    session.load().await;

    let followed = session
        .groups()
        .into_iter()
        .find(|g| g.key().to_string() == "followed")
        .unwrap();
    assert_eq!(session.on_group_activated(&followed).await, Activation::Nothing);

    assert_eq!(session.unread_total(), 1);
    assert_eq!(t.store.notifications.count_unread(me.id).await.unwrap(), 1);

    let rec = session.groups().remove(0);
    let activation = session.on_group_activated(&rec).await;
    assert_eq!(activation, Activation::Navigated(Subject::Thing("t9".into())));
    assert_eq!(rx.recv().await.unwrap(), FeedSignal::Navigate(Subject::Thing("t9".into())));
    assert_eq!(t.store.notifications.count_unread(me.id).await.unwrap(), 0);
}

#[tokio::test]
async fn scrolling_pages_through_everything() {
    let t = TestDb::spawn().await;
    let me = SeededUser::new("Me");
    t.seed_followers(&me, 5).await;

    let (session, _rx) = t.session(&me.id, 2);
    assert_eq!(session.load().await, LoadOutcome::Applied { records: 2 });
    assert_eq!(session.on_scroll(NEAR_BOTTOM).await, LoadOutcome::Applied { records: 2 });
    assert_eq!(session.on_scroll(NEAR_BOTTOM).await, LoadOutcome::Applied { records: 1 });
    assert_eq!(session.on_scroll(NEAR_BOTTOM).await, LoadOutcome::Skipped);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.record_count, 5);
    assert!(!snapshot.has_more);
    assert_eq!(session.groups().len(), 1);
    assert_eq!(session.groups()[0].total_count(), 5);
}

#[tokio::test]
async fn refresh_picks_up_new_notifications_and_keeps_reads() {
    let t = TestDb::spawn().await;
    let me = SeededUser::new("Me");
    let ann = SeededUser::new("Ann");
    t.seed_notification(&me, NotificationType::Comment, Some(&ann), Some(("t1", "Tacos")), 0)
        .await;

    let (session, _rx) = t.session(&me.id, 25);
    session.load().await;
    let group = session.groups().remove(0);
    session.on_group_activated(&group).await;

    t.seed_notification(&me, NotificationType::Followed, Some(&ann), None, 5)
        .await;
    assert_eq!(session.on_refresh_requested().await, LoadOutcome::Applied { records: 2 });

    assert_eq!(session.unread_total(), 1);
    assert_eq!(session.groups()[0].key().to_string(), "followed");
}

#[tokio::test]
async fn mark_all_read_updates_store_and_badge() {
    let t = TestDb::spawn().await;
    let me = SeededUser::new("Me");
    t.seed_followers(&me, 3).await;

    let (session, mut rx) = t.session(&me.id, 25);
    session.load().await;
    assert!(session.on_mark_all_read_requested().await);

    assert_eq!(session.unread_total(), 0);
    assert_eq!(rx.recv().await.unwrap(), FeedSignal::Haptic(Haptic::Success));
    assert_eq!(t.store.count_unread(session.read_state().user_id()).await.unwrap(), 0);
}

#[tokio::test]
async fn follow_back_writes_follow_without_marking_read() {
    let t = TestDb::spawn().await;
    let me = SeededUser::new("Me");
    let followers = t.seed_followers(&me, 1).await;

    let (session, _rx) = t.session(&me.id, 25);
    session.load().await;
    let group = session.groups().remove(0);

    let action = session.on_group_action(&group).await;
    assert!(matches!(action, Some(GroupAction::FollowBack(_))));
    assert!(t
        .store
        .follows
        .is_following(me.id, followers[0].id)
        .await
        .unwrap());
    assert_eq!(t.store.notifications.count_unread(me.id).await.unwrap(), 1);
    assert_eq!(session.unread_total(), 1);
}

#[tokio::test]
async fn answered_tag_reports_not_found() {
    let t = TestDb::spawn().await;
    let me = SeededUser::new("Me");
    let ann = SeededUser::new("Ann");

    let tag = t
        .store
        .tags
        .create("t1".to_string(), Some("Sushi".to_string()), ann.id, Some("Ann".to_string()), me.id)
        .await
        .unwrap();
    let tag_hex = tag.id.unwrap().to_hex();
    t.seed_with_data(
        &me,
        NotificationType::Tagged,
        NotificationData {
            thing_id: Some("t1".to_string()),
            thing_title: Some("Sushi".to_string()),
            tag_id: Some(tag_hex.clone()),
            from_user_id: Some(ann.id.to_hex()),
            from_user_name: Some("Ann".to_string()),
            ..NotificationData::default()
        },
        0,
    )
    .await;
    t.store.tags.respond(tag.id.unwrap(), false).await.unwrap();

    let (session, _rx) = t.session(&me.id, 25);
    session.load().await;
    let group = session.groups().remove(0);

    let activation = session.on_group_activated(&group).await;
    assert_eq!(activation, Activation::TagNotFound(TagId::new(tag_hex.clone())));
    assert_eq!(session.snapshot().missing_tag, Some(TagId::new(tag_hex)));
    assert_eq!(session.unread_total(), 0);
}
