//! Pure snapshot text codec.
//!
//! The wire shape is a JSON object mapping each relative path to
//! `{ "revision": number|null, "data": <any> }`. Encoding is deterministic
//! for a given snapshot and mode; key order is the snapshot's iteration
//! order. Both pretty and compact output round-trip through [`decode`].

use crate::Snapshot;

/// Serializes the full snapshot, pretty-printed or compact.
pub fn encode(
    snapshot: &Snapshot,
    prettify: bool,
) -> serde_json::Result<String> {
    if prettify {
        serde_json::to_string_pretty(snapshot)
    } else {
        serde_json::to_string(snapshot)
    }
}

/// Parses snapshot text back into its in-memory form.
///
/// Fails when the text is not a JSON object of the expected shape. Missing
/// `revision` or `data` fields decode to `null`; import normalizes null
/// data to the empty payload rather than failing.
pub fn decode(text: &str) -> serde_json::Result<Snapshot> {
    serde_json::from_str(text)
}
