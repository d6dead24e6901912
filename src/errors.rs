//! Error hierarchy for the reconciliation store.
//!
//! Errors are grouped by the layer that raises them: the in-memory store,
//! snapshot persistence, and the watcher attachment. Recoverable-by-nature
//! conditions (an absent snapshot file at startup) are handled internally
//! and never appear here.

use std::path::PathBuf;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// In-memory store contract violations (programmer errors)
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Snapshot encode/decode and durable storage failures
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// Watcher attachment failures
    #[error(transparent)]
    Watch(#[from] WatchError),

    /// Configuration loading/validation failures
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    /// Unrecoverable failures requiring caller attention
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A record may never hold a null payload.
    #[error("a non-null data payload is required for \"{path}\"")]
    InvalidArgument { path: String },

    /// An acknowledgment is one-shot; committing it twice is a usage bug.
    #[error("acknowledgment for \"{path}\" was already committed")]
    InvalidAcknowledge { path: String },
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The snapshot file exists but does not parse into the expected shape.
    /// Surfaced to the startup caller; the watcher is never attached.
    #[error("malformed snapshot at {path:?}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Read or write failure against durable storage.
    #[error("snapshot I/O failure at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// The watcher collaborator reported an error; the attachment is closed.
    #[error("watcher attachment failed: {0}")]
    Attach(String),

    /// Failure registering the OS-level watch.
    #[error(transparent)]
    Notify(#[from] notify::Error),

    /// The watcher event channel closed before the attachment became ready.
    #[error("watcher event channel closed")]
    Closed,
}
