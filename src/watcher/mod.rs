//! Watcher collaborator boundary.
//!
//! The reconciliation pipeline consumes a plain stream of [`WatchEvent`]s
//! over an unbounded channel; anything able to produce that stream is a
//! valid watcher. [`FsWatcher`] is the default adapter, built on the
//! `notify` crate.

mod fs_watcher;

pub use fs_watcher::*;
use tokio::sync::mpsc;

use crate::Revision;

/// Events emitted by a watcher attachment.
///
/// `Add`/`Change` carry the observed revision (mtime in ms for the
/// filesystem adapter), or [`Revision::Unknown`] when the source has no
/// revision information. `Ready` marks the end of the initial replay of
/// pre-existing files. `Error` is terminal for the attachment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WatchEvent {
    Ready,
    Error(String),
    Add { path: String, revision: Revision },
    Change { path: String, revision: Revision },
    Delete { path: String },
}

/// Receiving half of a watcher attachment's event stream.
pub type WatchEventReceiver = mpsc::UnboundedReceiver<WatchEvent>;
