//! Revision-tracked file reconciliation store.
//!
//! Tracks the observed state of files on disk — path, revision, opaque
//! payload — reconciles live watcher events against a persisted snapshot,
//! and notifies consumers exactly when a file is new, changed or removed.

mod config;
pub mod constants;
mod errors;
mod events;
mod router;
mod snapshot;
mod store;
mod vigil;
mod watcher;

pub use self::config::*;
pub use self::errors::*;
pub use self::events::*;
pub use self::snapshot::*;
pub use self::store::*;
pub use self::vigil::*;
pub use self::watcher::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
