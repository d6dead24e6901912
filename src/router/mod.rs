//! Event Router.
//!
//! Consumes the watcher event stream, translates every event into a store
//! operation, and re-emits the normalized notification stream. One router
//! per watcher attachment; the router task is the only event-driven store
//! mutator, so mutations apply strictly in delivery order.


use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::sync::watch;
use tracing::debug;
use tracing::error;
use tracing::trace;

use crate::Acknowledgment;
use crate::Classification;
use crate::Error;
use crate::Notification;
use crate::Reconciliation;
use crate::Result;
use crate::Revision;
use crate::SharedStore;
use crate::Subscribers;
use crate::WatchError;
use crate::WatchEvent;

/// Attachment lifecycle. `Ready` and `Failed` are terminal; a failed
/// attachment is never retried, a new one must be created.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AttachmentState {
    Initializing,
    Ready,
    Failed,
}

pub(crate) struct Router {
    store: SharedStore,
    subscribers: Subscribers,
    events: mpsc::UnboundedReceiver<WatchEvent>,
    shutdown: watch::Receiver<()>,
    /// Resolves the startup waiter once the attachment reaches Ready or
    /// Failed.
    ready_tx: Option<oneshot::Sender<Result<()>>>,
    state: AttachmentState,
}

impl Router {
    pub(crate) fn new(
        store: SharedStore,
        subscribers: Subscribers,
        events: mpsc::UnboundedReceiver<WatchEvent>,
        shutdown: watch::Receiver<()>,
        ready_tx: oneshot::Sender<Result<()>>,
    ) -> Self {
        Self {
            store,
            subscribers,
            events,
            shutdown,
            ready_tx: Some(ready_tx),
            state: AttachmentState::Initializing,
        }
    }

    /// Main event processing loop. Returns when the shutdown signal fires,
    /// the event source hangs up, or the attachment fails.
    pub(crate) async fn run(mut self) -> Result<()> {
        loop {
            tokio::select! {
                // Use biased to ensure branch order
                biased;
                // P0: shutdown received
                _ = self.shutdown.changed() => {
                    debug!("router shutdown signal received");
                    return Ok(());
                }
                // P1: watcher events, in delivery order
                event = self.events.recv() => {
                    match event {
                        Some(event) => self.handle(event)?,
                        None => {
                            debug!("watcher event channel closed");
                            if let Some(tx) = self.ready_tx.take() {
                                let _ = tx.send(Err(WatchError::Closed.into()));
                            }
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    fn handle(
        &mut self,
        event: WatchEvent,
    ) -> Result<()> {
        trace!("routing {event:?}");
        match event {
            WatchEvent::Ready => {
                self.state = AttachmentState::Ready;
                self.subscribers.emit(Notification::Ready);
                if let Some(tx) = self.ready_tx.take() {
                    let _ = tx.send(Ok(()));
                }
                Ok(())
            }
            WatchEvent::Error(message) => {
                self.state = AttachmentState::Failed;
                error!("watcher reported error, closing attachment: {message}");
                if let Some(tx) = self.ready_tx.take() {
                    let _ = tx.send(Err(Error::Watch(WatchError::Attach(message.clone()))));
                }
                Err(WatchError::Attach(message).into())
            }
            WatchEvent::Add { path, revision } => {
                self.subscribers.emit(Notification::WatcherAdd {
                    path: path.clone(),
                    revision,
                });

                // Warm-start replay: before Ready, a path the loaded
                // snapshot already covers produces no notification.
                if self.state == AttachmentState::Initializing
                    && self.store.lock().classify(&path, revision) == Classification::Current
                {
                    trace!("suppressed replay of current path {path}");
                    return Ok(());
                }
                self.reconcile(path, revision);
                Ok(())
            }
            WatchEvent::Change { path, revision } => {
                self.subscribers.emit(Notification::WatcherChange {
                    path: path.clone(),
                    revision,
                });
                self.reconcile(path, revision);
                Ok(())
            }
            WatchEvent::Delete { path } => {
                self.subscribers.emit(Notification::WatcherDelete { path: path.clone() });
                if let Some(data) = self.store.lock().remove(&path) {
                    self.subscribers.emit(Notification::Remove { path, data });
                }
                Ok(())
            }
        }
    }

    fn reconcile(
        &self,
        path: String,
        revision: Revision,
    ) {
        let outcome = self.store.lock().reconcile(&path, revision);
        match outcome {
            Reconciliation::Created { data } => {
                self.subscribers.emit(Notification::Create { path, data });
            }
            Reconciliation::Expired { data } => {
                let ack = Acknowledgment::new(&self.store, &path, revision);
                self.subscribers.emit(Notification::Expired { path, data, ack });
            }
            Reconciliation::Current { data } => {
                let ack = Acknowledgment::new(&self.store, &path, revision);
                self.subscribers.emit(Notification::Current { path, data, ack });
            }
        }
    }
}
