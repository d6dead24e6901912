//! Snapshot serialization and durable storage.
//!
//! [`codec`] is the pure text transformation; [`gateway`] owns the actual
//! reads and writes against the snapshot file.

pub mod codec;
pub mod gateway;

#[cfg(test)]
mod codec_test;
