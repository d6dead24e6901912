//! Durable storage for snapshots.
//!
//! Reads and writes the snapshot file. Writes go to a sibling temp file
//! first and are renamed into place, so the destination always holds a
//! complete snapshot. An absent file on load is not an error, just
//! "nothing to load".

use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;

use super::codec;
use crate::Result;
use crate::Snapshot;
use crate::SnapshotError;

/// Loads and decodes the snapshot at `path`, or `None` when no file
/// exists. A file that exists but fails to parse is a
/// [`SnapshotError::Malformed`].
pub async fn load_if_present(path: &Path) -> Result<Option<Snapshot>> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => {
            debug!("loading snapshot from {path:?}");
            let snapshot = codec::decode(&text).map_err(|source| SnapshotError::Malformed {
                path: path.to_owned(),
                source,
            })?;
            Ok(Some(snapshot))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(SnapshotError::Io {
            path: path.to_owned(),
            source,
        }
        .into()),
    }
}

/// Asynchronously writes the snapshot to `path`, creating parent
/// directories as needed.
pub async fn save(
    path: &Path,
    snapshot: &Snapshot,
    prettify: bool,
) -> Result<()> {
    let text = encode(path, snapshot, prettify)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| io_error(path, source))?;
        }
    }

    let staging = staging_path(path);
    tokio::fs::write(&staging, text)
        .await
        .map_err(|source| io_error(&staging, source))?;
    tokio::fs::rename(&staging, path)
        .await
        .map_err(|source| io_error(path, source))?;

    debug!("saved snapshot to {path:?}");
    Ok(())
}

/// Blocking variant of [`save`].
pub fn save_sync(
    path: &Path,
    snapshot: &Snapshot,
    prettify: bool,
) -> Result<()> {
    let text = encode(path, snapshot, prettify)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| io_error(path, source))?;
        }
    }

    let staging = staging_path(path);
    std::fs::write(&staging, text).map_err(|source| io_error(&staging, source))?;
    std::fs::rename(&staging, path).map_err(|source| io_error(path, source))?;

    debug!("saved snapshot to {path:?}");
    Ok(())
}

fn encode(
    path: &Path,
    snapshot: &Snapshot,
    prettify: bool,
) -> Result<String> {
    codec::encode(snapshot, prettify)
        .map_err(|source| {
            SnapshotError::Malformed {
                path: path.to_owned(),
                source,
            }
            .into()
        })
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn io_error(
    path: &Path,
    source: std::io::Error,
) -> crate::Error {
    SnapshotError::Io {
        path: path.to_owned(),
        source,
    }
    .into()
}
