//! Lifecycle controller.
//!
//! Orchestrates startup (load snapshot, attach watcher, signal readiness,
//! arm autosave) and shutdown (detach watchers, then flush the store).
//! Owns the frozen configuration and the shared store.


use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;
use tracing::error;

use crate::gateway;
use crate::router::Router;
use crate::Error;
use crate::FsWatcher;
use crate::Notification;
use crate::Record;
use crate::Result;
use crate::Settings;
use crate::SharedStore;
use crate::Snapshot;
use crate::Store;
use crate::Subscribers;
use crate::WatchEvent;

/// Revision-tracked file reconciliation store with snapshot persistence.
///
/// Construct with [`Vigil::new`], register observers with
/// [`Vigil::subscribe`], then [`Vigil::start`] a watcher attachment.
/// Configuration is frozen at construction; nothing mutates it afterward.
pub struct Vigil {
    settings: Arc<Settings>,
    store: SharedStore,
    subscribers: Subscribers,
    shutdown_tx: watch::Sender<()>,
    fault_tx: watch::Sender<Option<Arc<Error>>>,
    router_handle: Mutex<Option<JoinHandle<()>>>,
    autosave_handle: Mutex<Option<JoinHandle<()>>>,
    watchers: Mutex<Vec<FsWatcher>>,
    started: AtomicBool,
}

impl Vigil {
    pub fn new(settings: Settings) -> Self {
        debug!("initializing with {settings:?}");
        let (shutdown_tx, _) = watch::channel(());
        let (fault_tx, _) = watch::channel(None);
        Self {
            settings: Arc::new(settings),
            store: Arc::new(Mutex::new(Store::new())),
            subscribers: Subscribers::default(),
            shutdown_tx,
            fault_tx,
            router_handle: Mutex::new(None),
            autosave_handle: Mutex::new(None),
            watchers: Mutex::new(Vec::new()),
            started: AtomicBool::new(false),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Registers an observer of the normalized notification stream.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Notification> {
        self.subscribers.subscribe()
    }

    /// Read-through copy of the record at `path`, if any.
    pub fn get(
        &self,
        path: &str,
    ) -> Option<Record> {
        self.store.lock().get(path).cloned()
    }

    /// Point-in-time copy of the full store.
    pub fn export(&self) -> Snapshot {
        self.store.lock().export()
    }

    /// Starts against the default filesystem watcher.
    ///
    /// Sequence: load the persisted snapshot (a malformed or unreadable
    /// file aborts startup before any watcher is attached; an absent file
    /// is not an error), attach the watcher, arm autosave, then wait for
    /// the attachment to reach Ready or Failed.
    pub async fn start(
        &self,
        target: impl AsRef<Path>,
    ) -> Result<()> {
        self.claim_start()?;
        self.load_snapshot().await?;

        let (watcher, events) = FsWatcher::attach(target.as_ref(), self.settings.recursive)?;
        self.watchers.lock().push(watcher);
        self.spawn_pipeline(events).await
    }

    /// Starts against an externally produced event stream.
    ///
    /// This is the collaborator seam: any producer of [`WatchEvent`]s is a
    /// valid watcher. The stream must emit `Ready` once its initial replay
    /// is complete.
    pub async fn start_with_events(
        &self,
        events: mpsc::UnboundedReceiver<WatchEvent>,
    ) -> Result<()> {
        self.claim_start()?;
        self.load_snapshot().await?;
        self.spawn_pipeline(events).await
    }

    /// Detaches all watcher attachments and signals the background tasks
    /// to stop. Idempotent; once it returns, no further watcher events
    /// will be routed.
    pub fn stop(&self) {
        debug!("stopping");
        // Dropping the adapters deregisters the OS watches.
        self.watchers.lock().clear();
        let _ = self.shutdown_tx.send(());
    }

    /// Stops, waits for the background tasks to finish, then flushes the
    /// store to durable storage.
    pub async fn shutdown(&self) -> Result<()> {
        self.stop();
        let router = self.router_handle.lock().take();
        if let Some(handle) = router {
            let _ = handle.await;
        }
        let autosave = self.autosave_handle.lock().take();
        if let Some(handle) = autosave {
            let _ = handle.await;
        }
        self.save().await
    }

    /// Blocking variant of [`Vigil::shutdown`]: detaches watchers, then
    /// flushes synchronously.
    pub fn shutdown_sync(&self) -> Result<()> {
        self.stop();
        self.save_sync()
    }

    /// Exports the store and writes it to the configured destination.
    pub async fn save(&self) -> Result<()> {
        let snapshot = self.store.lock().export();
        gateway::save(&self.settings.destination, &snapshot, self.settings.prettify).await
    }

    /// Blocking variant of [`Vigil::save`].
    pub fn save_sync(&self) -> Result<()> {
        let snapshot = self.store.lock().export();
        gateway::save_sync(&self.settings.destination, &snapshot, self.settings.prettify)
    }

    /// Watches background (router/autosave) failures. Autosave failures
    /// land here; the host decides process fate.
    pub fn fault(&self) -> watch::Receiver<Option<Arc<Error>>> {
        self.fault_tx.subscribe()
    }

    fn claim_start(&self) -> Result<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(Error::Fatal("already started".into()));
        }
        Ok(())
    }

    async fn load_snapshot(&self) -> Result<()> {
        if let Some(snapshot) = gateway::load_if_present(&self.settings.destination).await? {
            debug!(
                "importing {} records from {:?}",
                snapshot.len(),
                self.settings.destination
            );
            self.store.lock().import(snapshot)?;
            self.subscribers.emit(Notification::Reload);
        }
        Ok(())
    }

    async fn spawn_pipeline(
        &self,
        events: mpsc::UnboundedReceiver<WatchEvent>,
    ) -> Result<()> {
        let (ready_tx, ready_rx) = oneshot::channel();
        let router = Router::new(
            self.store.clone(),
            self.subscribers.clone(),
            events,
            self.shutdown_tx.subscribe(),
            ready_tx,
        );

        let fault_tx = self.fault_tx.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = router.run().await {
                error!("router terminated: {e}");
                let _ = fault_tx.send(Some(Arc::new(e)));
            }
        });
        *self.router_handle.lock() = Some(handle);

        self.arm_autosave();

        match ready_rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(crate::WatchError::Closed.into()),
        }
    }

    fn arm_autosave(&self) {
        if self.settings.save_every_ms == 0 {
            return;
        }
        let period = Duration::from_millis(self.settings.save_every_ms);
        let store = self.store.clone();
        let settings = self.settings.clone();
        let fault_tx = self.fault_tx.clone();
        let mut shutdown = self.shutdown_tx.subscribe();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown.changed() => {
                        debug!("autosave stopped");
                        return;
                    }
                    _ = ticker.tick() => {
                        let snapshot = store.lock().export();
                        if let Err(e) = gateway::save(&settings.destination, &snapshot, settings.prettify).await {
                            error!("autosave failed: {e}");
                            let _ = fault_tx.send(Some(Arc::new(e)));
                            return;
                        }
                        debug!("autosave completed ({} records)", snapshot.len());
                    }
                }
            }
        });
        *self.autosave_handle.lock() = Some(handle);
    }
}
