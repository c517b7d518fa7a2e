#![allow(dead_code)]

pub mod command;
pub mod repository;

use headwatch::{HeadWatcherHandle, WatcherEvent, WatcherStatus};
use std::time::Duration;
use tokio::sync::broadcast;

/// Upper bound for a filesystem notification to travel through the watcher
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn next_event(events: &mut broadcast::Receiver<WatcherEvent>) -> WatcherEvent {
    tokio::time::timeout(EVENT_TIMEOUT, events.recv())
        .await
        .expect("Timed out waiting for a watcher event")
        .expect("Watcher event bus closed")
}

/// Assert that nothing is published for `quiet_period`
pub async fn assert_no_event(events: &mut broadcast::Receiver<WatcherEvent>, quiet_period: Duration) {
    if let Ok(event) = tokio::time::timeout(quiet_period, events.recv()).await {
        panic!("Expected no watcher event, got {:?}", event);
    }
}

/// Wait for the in-flight check to finish, re-arm included
pub async fn settled_status(watcher: &HeadWatcherHandle) -> WatcherStatus {
    tokio::time::timeout(EVENT_TIMEOUT, async {
        loop {
            match watcher.status() {
                WatcherStatus::Transitioning => tokio::time::sleep(Duration::from_millis(10)).await,
                status => return status,
            }
        }
    })
    .await
    .expect("Timed out waiting for the watcher to settle")
}
