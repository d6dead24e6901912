//! Consumer-facing notification stream.
//!
//! Event emission is modeled by composition: components hold a
//! [`Subscribers`] registry and broadcast named notifications to every
//! live subscriber. Delivery is synchronous at the send side; no delivery
//! order is guaranteed across distinct subscribers.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::Acknowledgment;
use crate::Revision;

/// Normalized notifications produced by the reconciliation pipeline.
///
/// `Current` and `Expired` carry the one-shot [`Acknowledgment`] that
/// advances the stored revision once the consumer has processed the
/// payload. The `Watcher*` variants are diagnostic pass-throughs of the
/// raw watcher events.
#[derive(Clone, Debug)]
pub enum Notification {
    /// The watcher attachment finished its initial replay.
    Ready,
    /// A persisted snapshot was imported at startup.
    Reload,
    /// A previously-unknown path was recorded; `data` is the empty seed
    /// payload for the consumer to populate.
    Create { path: String, data: Value },
    /// The stored record already covers the observation.
    Current {
        path: String,
        data: Value,
        ack: Acknowledgment,
    },
    /// The observation supersedes the stored record.
    Expired {
        path: String,
        data: Value,
        ack: Acknowledgment,
    },
    /// The path was deleted; `data` is the removed record's payload.
    Remove { path: String, data: Value },

    WatcherAdd { path: String, revision: Revision },
    WatcherChange { path: String, revision: Revision },
    WatcherDelete { path: String },
}

/// Registry of notification subscribers.
#[derive(Clone, Default)]
pub(crate) struct Subscribers {
    inner: Arc<Mutex<Vec<mpsc::UnboundedSender<Notification>>>>,
}

impl Subscribers {
    pub(crate) fn subscribe(&self) -> mpsc::UnboundedReceiver<Notification> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.lock().push(tx);
        rx
    }

    /// Broadcasts to every subscriber, pruning the ones that hung up.
    pub(crate) fn emit(
        &self,
        notification: Notification,
    ) {
        self.inner
            .lock()
            .retain(|tx| tx.send(notification.clone()).is_ok());
    }
}
