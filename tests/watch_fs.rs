//! Smoke test of the default filesystem adapter against a real
//! directory tree.

use std::path::Path;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio::time::timeout;
use vigil::Notification;
use vigil::Settings;
use vigil::Vigil;

/// Scans the notification stream until `matches` accepts one, tolerating
/// interleaved diagnostics and duplicate reconciliations.
async fn wait_for(
    rx: &mut mpsc::UnboundedReceiver<Notification>,
    what: &str,
    mut matches: impl FnMut(&Notification) -> bool,
) -> Notification {
    timeout(Duration::from_secs(10), async {
        loop {
            let notification = rx.recv().await.expect("notification stream closed");
            if matches(&notification) {
                return notification;
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {what}"))
}

fn key_of(dir: &Path, name: &str) -> String {
    dir.join(name).to_string_lossy().into_owned()
}

#[tokio::test]
async fn watch_real_directory_lifecycle() {
    let watched = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    std::fs::write(watched.path().join("a.txt"), "one").unwrap();

    let vigil = Vigil::new(Settings {
        destination: state.path().join("watched.json"),
        save_every_ms: 0,
        ..Settings::default()
    });
    let mut notifications = vigil.subscribe();
    vigil.start(watched.path()).await.unwrap();

    let a_key = key_of(watched.path(), "a.txt");
    let b_key = key_of(watched.path(), "b.txt");

    // Pre-existing file replayed before ready.
    wait_for(&mut notifications, "create of a.txt", |n| {
        matches!(n, Notification::Create { path, .. } if *path == a_key)
    })
    .await;
    wait_for(&mut notifications, "ready", |n| matches!(n, Notification::Ready)).await;
    assert!(vigil.get(&a_key).is_some());

    // A new file arrives.
    std::fs::write(watched.path().join("b.txt"), "two").unwrap();
    wait_for(&mut notifications, "create of b.txt", |n| {
        matches!(n, Notification::Create { path, .. } if *path == b_key)
    })
    .await;

    // Content changes bump the mtime past the stored revision.
    tokio::time::sleep(Duration::from_millis(100)).await;
    std::fs::write(watched.path().join("a.txt"), "one, revised").unwrap();
    let expired = wait_for(&mut notifications, "expired for a.txt", |n| {
        matches!(n, Notification::Expired { path, .. } if *path == a_key)
    })
    .await;
    if let Notification::Expired { ack, .. } = expired {
        ack.commit().unwrap();
    }

    // Deletion surfaces the removed record's data.
    std::fs::remove_file(watched.path().join("b.txt")).unwrap();
    wait_for(&mut notifications, "remove of b.txt", |n| {
        matches!(n, Notification::Remove { path, .. } if *path == b_key)
    })
    .await;
    assert!(vigil.get(&b_key).is_none());

    vigil.shutdown().await.unwrap();
    let saved = std::fs::read_to_string(&vigil.settings().destination).unwrap();
    assert!(saved.contains("a.txt"));
    assert!(!saved.contains("b.txt"));
}
