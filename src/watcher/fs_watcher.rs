use std::path::Path;
use std::time::UNIX_EPOCH;

use notify::RecursiveMode;
use notify::Watcher;
use tokio::sync::mpsc;
use tracing::debug;
use tracing::trace;

use super::WatchEvent;
use super::WatchEventReceiver;
use crate::Revision;
use crate::WatchError;

/// Default filesystem watcher adapter.
///
/// Registers an OS-level watch on the target, replays every file already
/// present as an `Add`, then emits `Ready` and streams live events.
/// Dropping the adapter deregisters the OS watch and ends the stream;
/// the handle must be kept alive for as long as events are wanted.
pub struct FsWatcher {
    _watcher: notify::RecommendedWatcher,
}

impl FsWatcher {
    /// Attaches to `target` (a file or a directory) and returns the
    /// adapter together with its event stream.
    ///
    /// The OS watch is registered before the initial scan, so changes
    /// racing the scan are delivered rather than lost; the resulting
    /// duplicate `Add`s are absorbed by the router's warm-start rule.
    pub fn attach(
        target: &Path,
        recursive: bool,
    ) -> std::result::Result<(Self, WatchEventReceiver), WatchError> {
        let (tx, rx) = mpsc::unbounded_channel();

        let bridge = tx.clone();
        let mut watcher =
            notify::recommended_watcher(move |outcome: notify::Result<notify::Event>| {
                match outcome {
                    Ok(event) => forward(&bridge, event),
                    Err(e) => {
                        let _ = bridge.send(WatchEvent::Error(e.to_string()));
                    }
                }
            })?;

        let mode = if recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher.watch(target, mode)?;
        debug!("watching {target:?} ({mode:?})");

        replay_existing(target, recursive, &tx)
            .map_err(|e| WatchError::Attach(format!("initial scan of {target:?} failed: {e}")))?;
        let _ = tx.send(WatchEvent::Ready);

        Ok((Self { _watcher: watcher }, rx))
    }
}

fn forward(
    tx: &mpsc::UnboundedSender<WatchEvent>,
    event: notify::Event,
) {
    use notify::EventKind;

    trace!("raw watcher event: {event:?}");
    for path in &event.paths {
        let observed = match &event.kind {
            EventKind::Create(_) if path.is_file() => WatchEvent::Add {
                path: path_key(path),
                revision: mtime_revision(path),
            },
            // Rename halves arrive as Modify(Name); a path that no longer
            // exists is a departure, not a change.
            EventKind::Modify(_) if path.is_file() => WatchEvent::Change {
                path: path_key(path),
                revision: mtime_revision(path),
            },
            EventKind::Modify(_) if !path.exists() => WatchEvent::Delete {
                path: path_key(path),
            },
            EventKind::Remove(_) => WatchEvent::Delete {
                path: path_key(path),
            },
            _ => continue,
        };
        if tx.send(observed).is_err() {
            return;
        }
    }
}

/// Emits an `Add` for every file already under `target`, mirroring the
/// replay a warm-started watcher performs against a loaded snapshot.
fn replay_existing(
    target: &Path,
    recursive: bool,
    tx: &mpsc::UnboundedSender<WatchEvent>,
) -> std::io::Result<()> {
    if target.is_file() {
        let _ = tx.send(WatchEvent::Add {
            path: path_key(target),
            revision: mtime_revision(target),
        });
        return Ok(());
    }

    for entry in std::fs::read_dir(target)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            if recursive {
                replay_existing(&entry.path(), recursive, tx)?;
            }
        } else if file_type.is_file() {
            let path = entry.path();
            let _ = tx.send(WatchEvent::Add {
                path: path_key(&path),
                revision: mtime_revision(&path),
            });
        }
    }
    Ok(())
}

/// Store key for an observed path. Case-sensitive, no normalization.
fn path_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Last-modified instant in milliseconds since the epoch, or `Unknown`
/// when the metadata cannot be read.
fn mtime_revision(path: &Path) -> Revision {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|mtime| mtime.duration_since(UNIX_EPOCH).ok())
        .map(|elapsed| Revision::At(elapsed.as_millis() as u64))
        .unwrap_or(Revision::Unknown)
}
