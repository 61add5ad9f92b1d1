//! Integration tests for the presence directory subscription.

mod helpers;

use std::sync::Arc;

use serde_json::json;
use tokio::sync::watch;

use fieldops_core::error::AppError;
use fieldops_core::traits::PresenceStore;
use fieldops_core::types::PositionFix;
use fieldops_entity::{PresenceRecord, PresenceUpdate};
use fieldops_store::MemoryPresenceStore;
use fieldops_tracking::PresenceDirectory;
use helpers::{FeedStore, USERS, document, identity, snapshot};

async fn wait_for_len(rx: &mut watch::Receiver<Arc<Vec<PresenceRecord>>>, len: usize) {
    rx.wait_for(|entries| entries.len() == len).await.unwrap();
}

#[tokio::test]
async fn test_only_records_with_both_coordinates_are_visible() {
    let store = Arc::new(MemoryPresenceStore::default());
    let directory = Arc::new(PresenceDirectory::new());
    let handle = directory.attach(store.clone(), USERS).await.unwrap();
    let mut rx = directory.watch();

    let ayse = identity("ayse@example.com");
    let veli = identity("veli@example.com");
    store
        .upsert(USERS, ayse.as_str(), PresenceUpdate::profile(&ayse))
        .await
        .unwrap();
    store
        .upsert(
            USERS,
            veli.as_str(),
            PresenceUpdate::location(&veli, &PositionFix::new(41.0, 28.9, None)),
        )
        .await
        .unwrap();

    wait_for_len(&mut rx, 1).await;
    assert!(directory.find(&veli).is_some());
    assert!(directory.find(&ayse).is_none());

    store
        .upsert(
            USERS,
            ayse.as_str(),
            PresenceUpdate::location(&ayse, &PositionFix::new(40.0, 29.0, Some(10.0))),
        )
        .await
        .unwrap();
    wait_for_len(&mut rx, 2).await;

    // First-write order: ayse's profile came first.
    let keys: Vec<String> = directory
        .entries()
        .iter()
        .map(|r| r.identity.to_string())
        .collect();
    assert_eq!(keys, vec!["ayse@example.com", "veli@example.com"]);
    assert!(directory.entries().iter().all(PresenceRecord::has_fix));

    handle.stop().await;
}

#[tokio::test]
async fn test_subscription_error_keeps_last_entries() {
    let (store, feed) = FeedStore::new();
    let directory = Arc::new(PresenceDirectory::new());
    let handle = directory.attach(Arc::new(store), USERS).await.unwrap();
    let mut rx = directory.watch();

    feed.send(Ok(snapshot(vec![
        document("a@example.com", json!({ "latitude": 40.0, "longitude": 29.0 })),
        document("b@example.com", json!({ "latitude": 40.5, "longitude": 29.5 })),
    ])))
    .unwrap();
    wait_for_len(&mut rx, 2).await;

    feed.send(Err(AppError::subscription("connection reset")))
        .unwrap();
    // Recovery after the error replaces the set again.
    feed.send(Ok(snapshot(vec![document(
        "a@example.com",
        json!({ "latitude": 40.1, "longitude": 29.0 }),
    )])))
    .unwrap();
    wait_for_len(&mut rx, 1).await;
    assert_eq!(
        directory.find(&identity("a@example.com")).unwrap().latitude,
        Some(40.1)
    );

    handle.stop().await;
}

#[tokio::test]
async fn test_error_alone_does_not_clear_entries() {
    let (store, feed) = FeedStore::new();
    let directory = Arc::new(PresenceDirectory::new());
    let handle = directory.attach(Arc::new(store), USERS).await.unwrap();
    let mut rx = directory.watch();

    feed.send(Ok(snapshot(vec![document(
        "a@example.com",
        json!({ "latitude": 40.0, "longitude": 29.0 }),
    )])))
    .unwrap();
    wait_for_len(&mut rx, 1).await;

    feed.send(Err(AppError::subscription("permission revoked")))
        .unwrap();
    drop(feed);
    // The feed closing ends the follow task once the error is drained.
    while handle.is_running() {
        tokio::task::yield_now().await;
    }

    assert_eq!(directory.len(), 1);
    handle.stop().await;
}

#[tokio::test]
async fn test_no_updates_after_stop() {
    let store = Arc::new(MemoryPresenceStore::default());
    let directory = Arc::new(PresenceDirectory::new());
    let handle = directory.attach(store.clone(), USERS).await.unwrap();
    assert_eq!(store.subscriber_count(USERS).await, 1);

    handle.stop().await;
    assert_eq!(store.subscriber_count(USERS).await, 0);

    let ayse = identity("ayse@example.com");
    store
        .upsert(
            USERS,
            ayse.as_str(),
            PresenceUpdate::location(&ayse, &PositionFix::new(40.0, 29.0, None)),
        )
        .await
        .unwrap();
    tokio::task::yield_now().await;

    assert!(directory.is_empty());
}
