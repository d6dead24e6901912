//! End-to-end scenarios driven through the public event-source seam.

use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio::time::timeout;
use vigil::Notification;
use vigil::Revision;
use vigil::Settings;
use vigil::Vigil;
use vigil::WatchEvent;

fn vigil_in(dir: &TempDir) -> Vigil {
    Vigil::new(Settings {
        destination: dir.path().join("watched.json"),
        save_every_ms: 0,
        ..Settings::default()
    })
}

async fn next_notification(
    rx: &mut mpsc::UnboundedReceiver<Notification>
) -> Notification {
    timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for a notification")
        .expect("notification stream closed")
}

/// Snapshot preload, then a newer change: one expired notification with
/// the persisted payload; committing the ack advances the revision.
#[tokio::test]
async fn warm_start_change_expires_and_ack_advances() {
    let dir = TempDir::new().unwrap();
    let vigil = vigil_in(&dir);
    std::fs::write(
        &vigil.settings().destination,
        r#"{"a.txt": {"revision": 10, "data": {"n": 1}}}"#,
    )
    .unwrap();

    let mut notifications = vigil.subscribe();
    let (events, events_rx) = mpsc::unbounded_channel();
    events.send(WatchEvent::Ready).unwrap();
    vigil.start_with_events(events_rx).await.unwrap();

    events
        .send(WatchEvent::Change {
            path: "a.txt".into(),
            revision: Revision::At(15),
        })
        .unwrap();

    assert!(matches!(next_notification(&mut notifications).await, Notification::Reload));
    assert!(matches!(next_notification(&mut notifications).await, Notification::Ready));
    assert!(matches!(
        next_notification(&mut notifications).await,
        Notification::WatcherChange { .. }
    ));
    match next_notification(&mut notifications).await {
        Notification::Expired { path, data, ack } => {
            assert_eq!(path, "a.txt");
            assert_eq!(data, json!({"n": 1}));
            assert_eq!(vigil.get("a.txt").unwrap().revision, Revision::At(10));
            ack.commit().unwrap();
        }
        other => panic!("expected Expired, got {other:?}"),
    }
    assert_eq!(vigil.get("a.txt").unwrap().revision, Revision::At(15));
}

/// Cold start, then an add for an unknown path: exactly one create, and
/// the record exists at the incoming revision.
#[tokio::test]
async fn cold_start_add_creates() {
    let dir = TempDir::new().unwrap();
    let vigil = vigil_in(&dir);

    let mut notifications = vigil.subscribe();
    let (events, events_rx) = mpsc::unbounded_channel();
    events.send(WatchEvent::Ready).unwrap();
    vigil.start_with_events(events_rx).await.unwrap();

    events
        .send(WatchEvent::Add {
            path: "b.txt".into(),
            revision: Revision::At(3),
        })
        .unwrap();

    assert!(matches!(next_notification(&mut notifications).await, Notification::Ready));
    assert!(matches!(
        next_notification(&mut notifications).await,
        Notification::WatcherAdd { .. }
    ));
    match next_notification(&mut notifications).await {
        Notification::Create { path, data } => {
            assert_eq!(path, "b.txt");
            assert_eq!(data, json!({}));
        }
        other => panic!("expected Create, got {other:?}"),
    }

    let record = vigil.get("b.txt").unwrap();
    assert_eq!(record.revision, Revision::At(3));

    // No snapshot existed, so no reload was emitted; the stream stays
    // quiet until the next event.
    vigil.shutdown().await.unwrap();
    assert!(vigil.settings().destination.exists());
}
