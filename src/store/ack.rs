use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Weak;

use parking_lot::Mutex;
use tracing::debug;

use super::Revision;
use super::SharedStore;
use super::Store;
use crate::StoreError;

/// One-shot capability that commits a pending revision advance.
///
/// Bound to a specific path and incoming revision at reconcile time. The
/// stored revision does not move until [`Acknowledgment::commit`] is
/// invoked, and the commit applies exactly once across all clones of the
/// token; repeat commits fail with [`StoreError::InvalidAcknowledge`]
/// without mutating anything.
#[derive(Clone)]
pub struct Acknowledgment {
    inner: Arc<AckInner>,
}

struct AckInner {
    store: Weak<Mutex<Store>>,
    path: String,
    revision: Revision,
    committed: AtomicBool,
}

impl Acknowledgment {
    pub(crate) fn new(
        store: &SharedStore,
        path: impl Into<String>,
        revision: Revision,
    ) -> Self {
        Self {
            inner: Arc::new(AckInner {
                store: Arc::downgrade(store),
                path: path.into(),
                revision,
                committed: AtomicBool::new(false),
            }),
        }
    }

    /// Path this acknowledgment is bound to.
    pub fn path(&self) -> &str {
        &self.inner.path
    }

    /// Revision the store will advance to on commit.
    pub fn revision(&self) -> Revision {
        self.inner.revision
    }

    pub fn is_committed(&self) -> bool {
        self.inner.committed.load(Ordering::SeqCst)
    }

    /// Commits the pending revision advance.
    ///
    /// Applies under the store lock, on the same mutation path as every
    /// other store edit. Committing after the store has shut down is a
    /// no-op.
    pub fn commit(&self) -> std::result::Result<(), StoreError> {
        if self.inner.committed.swap(true, Ordering::SeqCst) {
            return Err(StoreError::InvalidAcknowledge {
                path: self.inner.path.clone(),
            });
        }

        match self.inner.store.upgrade() {
            Some(store) => {
                if !store.lock().commit_revision(&self.inner.path, self.inner.revision) {
                    debug!("acknowledged {} after its record was removed", self.inner.path);
                }
            }
            None => {
                debug!("acknowledged {} after the store was dropped", self.inner.path);
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Acknowledgment {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Acknowledgment")
            .field("path", &self.inner.path)
            .field("revision", &self.inner.revision)
            .field("committed", &self.is_committed())
            .finish()
    }
}
