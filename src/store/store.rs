use indexmap::IndexMap;
use serde_json::Value;
use tracing::trace;

use super::empty_payload;
use super::Classification;
use super::Record;
use super::Revision;
use crate::StoreError;

/// Full serialized contents of the store at a point in time, used for
/// persistence and warm-start. Iteration order is the store's insertion
/// order.
pub type Snapshot = IndexMap<String, Record>;

/// Result of [`Store::reconcile`]. `Expired` and `Current` carry a clone of
/// the *existing* record's data; the stored revision is only advanced once
/// the consumer commits the matching acknowledgment.
#[derive(Clone, Debug, PartialEq)]
pub enum Reconciliation {
    Created { data: Value },
    Expired { data: Value },
    Current { data: Value },
}

/// Insertion-ordered map from relative path to [`Record`], plus the
/// revision-comparison logic that classifies incoming observations.
///
/// Keys are case-sensitive and not normalized. All operations are
/// synchronous and run to completion; persistence lives elsewhere.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Store {
    entries: IndexMap<String, Record>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(
        &self,
        path: &str,
    ) -> Option<&Record> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Record)> {
        self.entries.iter()
    }

    /// Unconditionally creates or overwrites the record at `path`. Used for
    /// bulk import and first-sight creation only; live observations go
    /// through [`Store::reconcile`].
    ///
    /// Overwriting an existing key keeps its insertion position.
    pub fn create(
        &mut self,
        path: impl Into<String>,
        revision: Revision,
        data: Value,
    ) -> std::result::Result<(), StoreError> {
        let path = path.into();
        if data.is_null() {
            return Err(StoreError::InvalidArgument { path });
        }
        self.entries.insert(path, Record::new(revision, data));
        Ok(())
    }

    /// Classifies an incoming observation against the stored record.
    ///
    /// `Stale` iff a record exists and `incoming` strictly exceeds its
    /// revision. An `Unknown` incoming revision is never `Stale` against an
    /// existing record. Equal revisions classify `Current`.
    pub fn classify(
        &self,
        path: &str,
        incoming: Revision,
    ) -> Classification {
        match self.entries.get(path) {
            None => Classification::NotPresent,
            Some(existing) if incoming > existing.revision => Classification::Stale,
            Some(_) => Classification::Current,
        }
    }

    /// The central decision+mutation step for every incoming add/change
    /// observation.
    ///
    /// Unknown paths are created with an empty seed payload at the incoming
    /// revision; the consumer populates the payload out of band. Known paths
    /// are left untouched: the returned `Expired`/`Current` carries the
    /// existing data, and the revision only advances via
    /// [`Store::commit_revision`] once the consumer acknowledges.
    pub fn reconcile(
        &mut self,
        path: &str,
        incoming: Revision,
    ) -> Reconciliation {
        match self.classify(path, incoming) {
            Classification::NotPresent => {
                let data = empty_payload();
                self.entries.insert(path.to_owned(), Record::new(incoming, data.clone()));
                trace!("created record for {path} at {incoming:?}");
                Reconciliation::Created { data }
            }
            Classification::Stale => {
                let data = self.entries[path].data.clone();
                Reconciliation::Expired { data }
            }
            Classification::Current => {
                let data = self.entries[path].data.clone();
                Reconciliation::Current { data }
            }
        }
    }

    /// Applies the deferred revision advance for an acknowledged
    /// observation. Returns false when the record no longer exists (removed
    /// between notification and acknowledgment).
    pub fn commit_revision(
        &mut self,
        path: &str,
        revision: Revision,
    ) -> bool {
        match self.entries.get_mut(path) {
            Some(record) => {
                record.revision = revision;
                true
            }
            None => false,
        }
    }

    /// Deletes the record at `path`, returning its prior data. A no-op
    /// returning `None` for unknown paths.
    pub fn remove(
        &mut self,
        path: &str,
    ) -> Option<Value> {
        self.entries.shift_remove(path).map(|record| record.data)
    }

    /// Trusted bulk load: every snapshot entry is created verbatim,
    /// overwriting existing records without any revision comparison. A
    /// null or missing `data` field normalizes to the empty seed payload.
    pub fn import(
        &mut self,
        snapshot: Snapshot,
    ) -> std::result::Result<(), StoreError> {
        for (path, record) in snapshot {
            let data = if record.data.is_null() {
                empty_payload()
            } else {
                record.data
            };
            self.create(path, record.revision, data)?;
        }
        Ok(())
    }

    /// Point-in-time copy of the full map, revisions and data included.
    pub fn export(&self) -> Snapshot {
        self.entries.clone()
    }
}

/// Builds a snapshot skeleton from a list of paths, with unknown revisions
/// and empty payloads, suitable for seeding a store via [`Store::import`].
pub fn snapshot_from_paths<I, S>(paths: I) -> Snapshot
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    paths
        .into_iter()
        .map(|path| (path.into(), Record::new(Revision::Unknown, empty_payload())))
        .collect()
}
