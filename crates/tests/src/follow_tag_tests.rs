use bson::oid::ObjectId;
use recfeed_feed::{FeedError, NotificationStore, TagId, UserId};

use crate::fixtures::seed::SeededUser;
use crate::fixtures::test_db::TestDb;

#[tokio::test]
async fn follow_is_idempotent() {
    let t = TestDb::spawn().await;
    let me = SeededUser::new("Me");
    let ann = SeededUser::new("Ann");

    assert!(t.store.follows.follow(me.id, ann.id).await.unwrap());
    assert!(!t.store.follows.follow(me.id, ann.id).await.unwrap());
    assert!(t.store.follows.is_following(me.id, ann.id).await.unwrap());
    assert!(!t.store.follows.is_following(ann.id, me.id).await.unwrap());

    let count = t
        .store
        .follows
        .base
        .count(bson::doc! { "follower_id": me.id })
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn store_follow_user_succeeds_twice() {
    let t = TestDb::spawn().await;
    let me = UserId::new(ObjectId::new().to_hex());
    let ann = UserId::new(ObjectId::new().to_hex());

    t.store.follow_user(&me, &ann).await.unwrap();
    t.store.follow_user(&me, &ann).await.unwrap();
}

#[tokio::test]
async fn find_tag_only_returns_pending_tags() {
    let t = TestDb::spawn().await;
    let me = SeededUser::new("Me");
    let ann = SeededUser::new("Ann");

    let tag = t
        .store
        .tags
        .create(
            "thing-1".to_string(),
            Some("Sushi".to_string()),
            ann.id,
            Some(ann.name.clone()),
            me.id,
        )
        .await
        .unwrap();
    let tag_id = TagId::new(tag.id.unwrap().to_hex());

    let found = t.store.find_tag(&tag_id).await.unwrap();
    assert_eq!(found.id, tag_id);
    assert_eq!(found.thing_title.as_deref(), Some("Sushi"));
    assert_eq!(found.from_user_name.as_deref(), Some("Ann"));

    assert!(t.store.tags.respond(tag.id.unwrap(), true).await.unwrap());
    assert!(!t.store.tags.respond(tag.id.unwrap(), false).await.unwrap());
    assert!(matches!(
        t.store.find_tag(&tag_id).await,
        Err(FeedError::NotFound(_))
    ));
}

#[tokio::test]
async fn malformed_ids_are_not_found() {
    let t = TestDb::spawn().await;
    assert!(matches!(
        t.store.find_tag(&TagId::new("not-an-object-id")).await,
        Err(FeedError::NotFound(_))
    ));
}
