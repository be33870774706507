//! Notification fanout scenarios: mention resolution, recipient
//! exclusion rules, persist-before-push, and recipient-scoped reads.
//!
//! Run with: cargo test -p integration-tests --test fanout_tests

use std::sync::Arc;

use integration_tests::{
    build_context, default_users, CollectingPush, FailingNotificationRepository, Harness,
    MemoryMessageRepository, MemoryNotificationRepository, MemoryUserRepository, ALICE_ID, BOB_ID,
    CAROL_ID,
};
use pulse_core::entities::NotificationKind;
use pulse_core::Snowflake;
use pulse_gateway::protocol::ServerEvent;
use pulse_service::{NotificationService, ServiceError};

const POST_ID: Snowflake = Snowflake::new(500);

struct FanoutSetup {
    notifications: Arc<MemoryNotificationRepository>,
    push: CollectingPush,
    ctx: pulse_service::ServiceContext,
}

fn setup() -> FanoutSetup {
    let notifications = Arc::new(MemoryNotificationRepository::new());
    let ctx = build_context(
        Arc::new(MemoryUserRepository::with_users(default_users())),
        Arc::new(MemoryMessageRepository::new()),
        notifications.clone(),
    );
    FanoutSetup {
        notifications,
        push: CollectingPush::new(),
        ctx,
    }
}

// ============================================================================
// Mentions
// ============================================================================

#[tokio::test]
async fn test_duplicate_mentions_notify_once() {
    let s = setup();
    let service = NotificationService::new(&s.ctx, &s.push);

    let created = service
        .notify_post_mentions(ALICE_ID, "Greetings", "hello @bob and @bob again", POST_ID)
        .await
        .unwrap();

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].recipient_id, BOB_ID);
    assert_eq!(created[0].kind, NotificationKind::Mention);
    assert_eq!(s.notifications.for_recipient(BOB_ID).len(), 1);
    assert!(s.notifications.for_recipient(ALICE_ID).is_empty());
}

#[tokio::test]
async fn test_self_mention_is_suppressed() {
    let s = setup();
    let service = NotificationService::new(&s.ctx, &s.push);

    let created = service
        .notify_post_mentions(ALICE_ID, "Note", "reminder to @alice and @bob", POST_ID)
        .await
        .unwrap();

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].recipient_id, BOB_ID);
    assert!(s.notifications.for_recipient(ALICE_ID).is_empty());
}

#[tokio::test]
async fn test_unresolvable_mention_is_ignored() {
    let s = setup();
    let service = NotificationService::new(&s.ctx, &s.push);

    let created = service
        .notify_post_mentions(ALICE_ID, "Hi", "ping @nobody_here", POST_ID)
        .await
        .unwrap();

    assert!(created.is_empty());
    assert!(s.notifications.all().is_empty());
    assert!(s.push.pushed().is_empty());
}

#[tokio::test]
async fn test_comment_mentions_exclude_post_owner() {
    let s = setup();
    let service = NotificationService::new(&s.ctx, &s.push);

    // Alice comments on Bob's post mentioning both Bob and Carol; Bob
    // already gets the comment notification for this event.
    let created = service
        .notify_comment_mentions(ALICE_ID, BOB_ID, "Bob's post", "cc @bob @carol", POST_ID)
        .await
        .unwrap();

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].recipient_id, CAROL_ID);
    assert!(created[0].message.contains("Bob's post"));
}

// ============================================================================
// Comments and reactions
// ============================================================================

#[tokio::test]
async fn test_comment_notifies_post_owner() {
    let s = setup();
    let service = NotificationService::new(&s.ctx, &s.push);

    let created = service
        .notify_comment(BOB_ID, ALICE_ID, "Bob's post", POST_ID)
        .await
        .unwrap()
        .expect("notification created");

    assert_eq!(created.recipient_id, BOB_ID);
    assert_eq!(created.actor_id, ALICE_ID);
    assert_eq!(created.kind, NotificationKind::Comment);
    assert_eq!(created.message, "commented on your post: \"Bob's post\"");
    assert_eq!(created.post_id, Some(POST_ID));
}

#[tokio::test]
async fn test_self_comment_is_suppressed() {
    let s = setup();
    let service = NotificationService::new(&s.ctx, &s.push);

    let created = service
        .notify_comment(ALICE_ID, ALICE_ID, "My own post", POST_ID)
        .await
        .unwrap();

    assert!(created.is_none());
    assert!(s.notifications.all().is_empty());
    assert!(s.push.pushed().is_empty());
}

#[tokio::test]
async fn test_self_reaction_is_suppressed() {
    let s = setup();
    let service = NotificationService::new(&s.ctx, &s.push);

    let created = service
        .notify_reaction(ALICE_ID, ALICE_ID, "like", "My own post", POST_ID)
        .await
        .unwrap();

    assert!(created.is_none());
    assert!(s.notifications.all().is_empty());
}

#[tokio::test]
async fn test_reaction_notifies_post_owner() {
    let s = setup();
    let service = NotificationService::new(&s.ctx, &s.push);

    let created = service
        .notify_reaction(BOB_ID, ALICE_ID, "fire", "Bob's post", POST_ID)
        .await
        .unwrap()
        .expect("notification created");

    assert_eq!(created.kind, NotificationKind::Reaction);
    assert_eq!(created.message, "reacted fire to your post: \"Bob's post\"");
    assert_eq!(s.push.pushed().len(), 1);
    assert_eq!(s.push.pushed()[0].0, BOB_ID);
}

// ============================================================================
// Persist before push
// ============================================================================

#[tokio::test]
async fn test_persistence_failure_skips_push() {
    let push = CollectingPush::new();
    let ctx = build_context(
        Arc::new(MemoryUserRepository::with_users(default_users())),
        Arc::new(MemoryMessageRepository::new()),
        Arc::new(FailingNotificationRepository),
    );
    let service = NotificationService::new(&ctx, &push);

    let result = service
        .notify_comment(BOB_ID, ALICE_ID, "Bob's post", POST_ID)
        .await;

    assert!(result.is_err());
    assert!(push.pushed().is_empty());
}

#[tokio::test]
async fn test_offline_recipient_gets_stored_notification_only() {
    // The registry itself is the push sink; Bob has no connection.
    let harness = Harness::new(default_users());
    let service = NotificationService::new(&harness.ctx, harness.registry.as_ref());

    let created = service
        .notify_comment(BOB_ID, ALICE_ID, "Bob's post", POST_ID)
        .await
        .unwrap()
        .expect("notification created");

    assert_eq!(harness.notifications.for_recipient(BOB_ID).len(), 1);
    assert!(!created.read);
}

#[tokio::test]
async fn test_online_recipient_gets_live_push() {
    let harness = Harness::new(default_users());
    let mut bob = harness.connect(BOB_ID, "bob");
    bob.events();

    let service = NotificationService::new(&harness.ctx, harness.registry.as_ref());
    let created = service
        .notify_comment(BOB_ID, ALICE_ID, "Bob's post", POST_ID)
        .await
        .unwrap()
        .expect("notification created");

    let events = bob.events();
    assert_eq!(events.len(), 1);
    let ServerEvent::Notification { notification } = &events[0] else {
        panic!("expected notification, got {:?}", events[0]);
    };
    assert_eq!(notification.id, created.id);
    assert_eq!(notification.actor, ALICE_ID);

    // Stored regardless of the push outcome
    assert_eq!(harness.notifications.for_recipient(BOB_ID).len(), 1);
}

// ============================================================================
// Recipient-scoped reads and mutations
// ============================================================================

#[tokio::test]
async fn test_list_is_newest_first_and_capped() {
    let s = setup();
    let service = NotificationService::new(&s.ctx, &s.push);

    for i in 0..5 {
        service
            .notify_comment(BOB_ID, ALICE_ID, &format!("Post {i}"), POST_ID)
            .await
            .unwrap();
    }

    let listed = service.list(BOB_ID, Some(3)).await.unwrap();
    assert_eq!(listed.len(), 3);
    assert!(listed.windows(2).all(|w| w[0].created_at >= w[1].created_at));
}

#[tokio::test]
async fn test_mark_read_is_recipient_scoped() {
    let s = setup();
    let service = NotificationService::new(&s.ctx, &s.push);

    let created = service
        .notify_comment(BOB_ID, ALICE_ID, "Bob's post", POST_ID)
        .await
        .unwrap()
        .expect("notification created");

    // Carol cannot touch Bob's notification
    let result = service.mark_read(CAROL_ID, created.id).await;
    assert!(matches!(result, Err(ServiceError::NotFound { .. })));

    service.mark_read(BOB_ID, created.id).await.unwrap();
    assert!(s.notifications.for_recipient(BOB_ID)[0].read);
}

#[tokio::test]
async fn test_mark_all_read_counts_only_unread() {
    let s = setup();
    let service = NotificationService::new(&s.ctx, &s.push);

    for i in 0..3 {
        service
            .notify_comment(BOB_ID, ALICE_ID, &format!("Post {i}"), POST_ID)
            .await
            .unwrap();
    }
    let first = s.notifications.for_recipient(BOB_ID)[0].id;
    service.mark_read(BOB_ID, first).await.unwrap();

    assert_eq!(service.mark_all_read(BOB_ID).await.unwrap(), 2);
    assert_eq!(service.mark_all_read(BOB_ID).await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_is_recipient_scoped() {
    let s = setup();
    let service = NotificationService::new(&s.ctx, &s.push);

    let created = service
        .notify_comment(BOB_ID, ALICE_ID, "Bob's post", POST_ID)
        .await
        .unwrap()
        .expect("notification created");

    assert!(service.delete(CAROL_ID, created.id).await.is_err());
    assert_eq!(s.notifications.for_recipient(BOB_ID).len(), 1);

    service.delete(BOB_ID, created.id).await.unwrap();
    assert!(s.notifications.for_recipient(BOB_ID).is_empty());
}
