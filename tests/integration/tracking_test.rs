//! Integration tests for location reporting through a mounted screen.

mod helpers;

use std::sync::atomic::Ordering;
use std::time::Duration;

use chrono::Utc;
use tokio::time;

use fieldops_core::traits::PresenceStore;
use fieldops_core::types::{AppLifecycle, Coordinates, LocationError, PositionFix};
use fieldops_entity::PresenceRecord;
use fieldops_tracking::view::time_ago;
use fieldops_tracking::{InitError, InitStage, ScreenStatus, SessionIdentity};
use helpers::{ScriptedGeolocation, TestTracker, USERS, identity};

async fn stored_records(tracker: &TestTracker) -> Vec<PresenceRecord> {
    tracker
        .store
        .inner
        .list(USERS)
        .await
        .unwrap()
        .iter()
        .map(|d| PresenceRecord::from_document(d).unwrap())
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_periodic_cycles_follow_interval() {
    let tracker = TestTracker::signed_in("ayse@example.com");

    let status = tracker.screen.mount(tracker.lifecycle.subscribe()).await;
    assert_eq!(status, ScreenStatus::Ready);
    assert_eq!(tracker.geolocation.requests(), 1);

    time::sleep(Duration::from_secs(245)).await;
    assert_eq!(tracker.geolocation.requests(), 3);
    assert_eq!(tracker.screen.reporter().stats().reported, 2);

    tracker.screen.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn test_unmount_stops_all_cycles() {
    let tracker = TestTracker::signed_in("ayse@example.com");
    tracker.screen.mount(tracker.lifecycle.subscribe()).await;
    tracker.screen.unmount().await;

    tracker.lifecycle.set(AppLifecycle::Background);
    tracker.lifecycle.set(AppLifecycle::Active);
    time::sleep(Duration::from_secs(1000)).await;

    assert_eq!(tracker.geolocation.requests(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_activation_reports_immediately() {
    let tracker = TestTracker::signed_in("ayse@example.com");
    tracker.screen.mount(tracker.lifecycle.subscribe()).await;

    tracker.lifecycle.set(AppLifecycle::Inactive);
    time::sleep(Duration::from_secs(5)).await;
    tracker
        .geolocation
        .set_fallback(Ok(PositionFix::new(40.2, 29.1, Some(8.0))));
    tracker.lifecycle.set(AppLifecycle::Active);
    time::sleep(Duration::from_secs(1)).await;

    assert_eq!(tracker.geolocation.requests(), 2);
    assert_eq!(
        tracker.screen.own_fix(),
        Some(PositionFix::new(40.2, 29.1, Some(8.0)))
    );
    let records = stored_records(&tracker).await;
    assert_eq!(records[0].latitude, Some(40.2));

    tracker.screen.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn test_failed_cycle_keeps_schedule_running() {
    let tracker = TestTracker::signed_in("ayse@example.com");
    tracker.screen.mount(tracker.lifecycle.subscribe()).await;

    tracker.geolocation.push(Err(LocationError::Timeout));
    tracker.geolocation.push(Err(LocationError::ServiceUnavailable));
    tracker
        .geolocation
        .set_fallback(Ok(PositionFix::new(41.0, 29.0, None)));

    time::sleep(Duration::from_secs(365)).await;

    let stats = tracker.screen.reporter().stats();
    assert_eq!(stats.acquisition_failures, 2);
    assert_eq!(stats.reported, 1);
    assert_eq!(stored_records(&tracker).await[0].latitude, Some(41.0));

    tracker.screen.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_triggers_leave_one_record() {
    let tracker = TestTracker::build(
        ScriptedGeolocation::at(40.0, 29.0, 10.0).with_latency(Duration::from_secs(10)),
        SessionIdentity::signed_in(identity("ayse@example.com")),
    );
    // The first fix takes 10s, so mount returns at t=10.
    tracker.screen.mount(tracker.lifecycle.subscribe()).await;

    time::sleep(Duration::from_secs(105)).await;
    tracker.lifecycle.set(AppLifecycle::Background);
    time::sleep(Duration::from_secs(1)).await;
    // Activation at t=116 is still acquiring when the t=120 tick fires.
    tracker.lifecycle.set(AppLifecycle::Active);
    time::sleep(Duration::from_secs(34)).await;

    assert_eq!(tracker.screen.reporter().stats().reported, 2);
    assert_eq!(stored_records(&tracker).await.len(), 1);

    tracker.screen.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn test_signed_out_cycles_are_noops() {
    let tracker = TestTracker::build(
        ScriptedGeolocation::at(40.0, 29.0, 10.0),
        SessionIdentity::signed_out(),
    );
    let status = tracker.screen.mount(tracker.lifecycle.subscribe()).await;
    assert_eq!(status, ScreenStatus::Failed(InitError::NotSignedIn));

    time::sleep(Duration::from_secs(250)).await;

    assert_eq!(tracker.geolocation.requests(), 0);
    assert_eq!(tracker.screen.reporter().stats().skipped, 2);
    assert_eq!(tracker.store.writes.load(Ordering::SeqCst), 0);

    tracker.session.sign_in(identity("ayse@example.com"));
    assert_eq!(tracker.screen.retry().await, ScreenStatus::Ready);
    tracker.screen.unmount().await;
}

#[tokio::test]
async fn test_services_disabled_reported_before_permission() {
    let geolocation = ScriptedGeolocation::at(40.0, 29.0, 10.0);
    geolocation.services_enabled.store(false, Ordering::SeqCst);
    geolocation.foreground.store(false, Ordering::SeqCst);
    let tracker = TestTracker::build(
        geolocation,
        SessionIdentity::signed_in(identity("ayse@example.com")),
    );

    let status = tracker.screen.mount(tracker.lifecycle.subscribe()).await;
    assert_eq!(status, ScreenStatus::Failed(InitError::ServicesDisabled));

    tracker
        .geolocation
        .services_enabled
        .store(true, Ordering::SeqCst);
    assert_eq!(
        tracker.screen.retry().await,
        ScreenStatus::Failed(InitError::PermissionDenied)
    );

    tracker.geolocation.foreground.store(true, Ordering::SeqCst);
    assert_eq!(tracker.screen.retry().await, ScreenStatus::Ready);
    assert_eq!(tracker.screen.reporter().stage(), InitStage::Subscribed);

    tracker.screen.unmount().await;
}

#[tokio::test]
async fn test_write_failure_does_not_block_initialization() {
    let tracker = TestTracker::signed_in("ayse@example.com");
    tracker.store.fail_writes.store(true, Ordering::SeqCst);

    let status = tracker.screen.mount(tracker.lifecycle.subscribe()).await;
    assert_eq!(status, ScreenStatus::Ready);
    assert_eq!(
        tracker.screen.own_fix(),
        Some(PositionFix::new(40.0, 29.0, Some(10.0)))
    );
    assert!(stored_records(&tracker).await.is_empty());
    assert!(tracker.screen.presence_list().is_empty());

    tracker.screen.unmount().await;
}

#[tokio::test]
async fn test_fix_is_shown_then_ages_without_moving() {
    let tracker = TestTracker::signed_in("ayse@example.com");
    tracker.screen.mount(tracker.lifecycle.subscribe()).await;
    tracker.wait_for_entries(1).await;

    let t0 = Utc::now();
    let doc = tracker.screen.render(t0).await.unwrap().unwrap();
    assert_eq!(doc.markers.len(), 1);
    let marker = &doc.markers[0];
    assert_eq!(
        Coordinates::new(marker.latitude, marker.longitude),
        Coordinates::new(40.0, 29.0)
    );
    assert!(marker.own);
    assert!(marker.popup.contains("just now"));

    let later = t0 + chrono::Duration::seconds(130);
    let doc = tracker.screen.render(later).await.unwrap().unwrap();
    let marker = &doc.markers[0];
    assert_eq!(
        Coordinates::new(marker.latitude, marker.longitude),
        Coordinates::new(40.0, 29.0)
    );
    assert!(marker.popup.contains("2 minutes ago"));

    let record = &tracker.screen.presence_list()[0];
    assert!(time_ago(later, record.last_location_update).is_minutes());
    assert_eq!(record.accuracy, Some(10.0));
    assert!(record.is_online);

    tracker.screen.unmount().await;
}

#[tokio::test]
async fn test_select_then_clear_returns_to_own_fix() {
    let tracker = TestTracker::signed_in("ayse@example.com");
    tracker.screen.mount(tracker.lifecycle.subscribe()).await;
    tracker.wait_for_entries(1).await;

    let me = identity("ayse@example.com");
    tracker.screen.select(&me).await.unwrap();
    let selected = tracker.screen.render(Utc::now()).await.unwrap().unwrap();
    assert_eq!(selected.target.zoom, 15);
    assert!(selected.markers[0].selected);

    tracker.screen.clear().await;
    assert!(tracker.screen.selection().await.is_none());
    let cleared = tracker.screen.render(Utc::now()).await.unwrap().unwrap();
    assert_eq!(cleared.target.zoom, 13);
    assert_eq!(cleared.target.center, Coordinates::new(40.0, 29.0));

    assert!(tracker.screen.select(&identity("ghost@example.com")).await.is_err());

    tracker.screen.unmount().await;
}

#[tokio::test]
async fn test_failed_subscription_is_reopened() {
    let tracker = TestTracker::signed_in("ayse@example.com");
    tracker.store.fail_subscribes.store(1, Ordering::SeqCst);

    let status = tracker.screen.mount(tracker.lifecycle.subscribe()).await;
    assert_eq!(status, ScreenStatus::Ready);
    assert!(!tracker.screen.is_directory_live().await);
    assert!(tracker.screen.presence_list().is_empty());

    assert!(tracker.screen.ensure_directory().await);
    tracker.wait_for_entries(1).await;
    assert_eq!(tracker.screen.reporter().stage(), InitStage::Subscribed);

    // A live subscription is not opened twice.
    assert!(tracker.screen.ensure_directory().await);
    assert_eq!(tracker.store.inner.subscriber_count(USERS).await, 1);

    tracker.screen.unmount().await;
}

#[tokio::test]
async fn test_retry_reopens_failed_subscription() {
    let tracker = TestTracker::signed_in("ayse@example.com");
    tracker.store.fail_subscribes.store(1, Ordering::SeqCst);
    tracker.screen.mount(tracker.lifecycle.subscribe()).await;
    assert!(!tracker.screen.is_directory_live().await);

    assert_eq!(tracker.screen.retry().await, ScreenStatus::Ready);
    assert!(tracker.screen.is_directory_live().await);
    tracker.wait_for_entries(1).await;

    tracker.screen.unmount().await;
}
