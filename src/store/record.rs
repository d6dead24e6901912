use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// An ordered marker of how recent a file's observed state is.
///
/// `Unknown` orders below every concrete revision, including `At(0)`: an
/// observation carrying no revision information can never supersede a known
/// one, and a legitimate revision of zero is never mistaken for "no
/// revision". Serialized as a JSON number or `null`.
///
/// The numeric domain is milliseconds since the Unix epoch when revisions
/// come from file mtimes, but any totally-ordered `u64` is valid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Option<u64>", into = "Option<u64>")]
pub enum Revision {
    #[default]
    Unknown,
    At(u64),
}

impl From<Option<u64>> for Revision {
    fn from(value: Option<u64>) -> Self {
        match value {
            Some(n) => Revision::At(n),
            None => Revision::Unknown,
        }
    }
}

impl From<Revision> for Option<u64> {
    fn from(value: Revision) -> Self {
        match value {
            Revision::At(n) => Some(n),
            Revision::Unknown => None,
        }
    }
}

/// One entry of the store: the last observed revision of a path plus an
/// opaque consumer-owned payload. The store never inspects `data` beyond
/// null-ness; `data` is never `Value::Null` while the record exists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub revision: Revision,
    #[serde(default)]
    pub data: Value,
}

impl Record {
    pub fn new(
        revision: Revision,
        data: Value,
    ) -> Self {
        Self { revision, data }
    }
}

/// Outcome of comparing an incoming observation against the stored record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    /// No record exists for the path.
    NotPresent,
    /// The incoming revision strictly supersedes the stored one.
    Stale,
    /// The stored record already covers the incoming revision (equal
    /// revisions included).
    Current,
}

/// Seed payload for records created on first sight. Consumers populate the
/// real payload out of band after receiving the `create` notification.
pub(crate) fn empty_payload() -> Value {
    Value::Object(serde_json::Map::new())
}
