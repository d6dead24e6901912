//! The revision-tracked reconciliation store.
//!
//! Pure in-memory path → record map plus the classification logic that
//! decides, for every observed filesystem state, whether it is new,
//! supersedes the stored state, or is already covered by it. No I/O
//! happens here.

mod ack;
mod record;
mod store;


use std::sync::Arc;

pub use ack::*;
use parking_lot::Mutex;
pub use record::*;
pub use store::*;

/// Shared handle to the store. The router task is the only event-driven
/// mutator; acknowledgments apply their deferred commit under the same lock.
pub(crate) type SharedStore = Arc<Mutex<Store>>;
