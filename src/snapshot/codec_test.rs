use serde_json::json;

use super::codec::decode;
use super::codec::encode;
use crate::Record;
use crate::Revision;
use crate::Snapshot;

fn sample_snapshot() -> Snapshot {
    let mut snapshot = Snapshot::new();
    snapshot.insert(
        "src/app.js".into(),
        Record::new(Revision::At(1_700_000_000_000), json!({"size": 42})),
    );
    snapshot.insert("src/lib.js".into(), Record::new(Revision::Unknown, json!({})));
    snapshot
}

/// # Case 1: decode(encode(S)) yields an equivalent snapshot, both modes
#[test]
fn test_round_trip_pretty_and_compact() {
    let snapshot = sample_snapshot();

    for prettify in [true, false] {
        let text = encode(&snapshot, prettify).unwrap();
        let decoded = decode(&text).unwrap();
        assert_eq!(decoded, snapshot, "prettify={prettify}");
    }
}

/// # Case 2: encoding is deterministic and preserves iteration order
#[test]
fn test_encode_is_deterministic() {
    let snapshot = sample_snapshot();
    assert_eq!(encode(&snapshot, true).unwrap(), encode(&snapshot, true).unwrap());

    let compact = encode(&snapshot, false).unwrap();
    let app = compact.find("src/app.js").unwrap();
    let lib = compact.find("src/lib.js").unwrap();
    assert!(app < lib, "insertion order must survive encoding");
}

/// # Case 3: the documented wire shape decodes, null fields included
#[test]
fn test_decode_wire_format() {
    let text = r#"{
  "src/app.js": { "revision": 1700000000000, "data": {"size": 42} },
  "src/lib.js": { "revision": null, "data": null }
}"#;

    let snapshot = decode(text).unwrap();
    assert_eq!(snapshot["src/app.js"].revision, Revision::At(1_700_000_000_000));
    assert_eq!(snapshot["src/app.js"].data, json!({"size": 42}));
    assert_eq!(snapshot["src/lib.js"].revision, Revision::Unknown);
    assert_eq!(snapshot["src/lib.js"].data, serde_json::Value::Null);
}

/// # Case 4: missing revision/data fields decode as null rather than
/// failing
#[test]
fn test_decode_tolerates_missing_fields() {
    let snapshot = decode(r#"{"a.txt": {}}"#).unwrap();
    assert_eq!(snapshot["a.txt"].revision, Revision::Unknown);
    assert_eq!(snapshot["a.txt"].data, serde_json::Value::Null);
}

/// # Case 5: text that is not a path → record mapping is malformed
#[test]
fn test_decode_rejects_wrong_shape() {
    assert!(decode("not json at all").is_err());
    assert!(decode(r#"["a.txt"]"#).is_err());
    assert!(decode(r#"{"a.txt": {"revision": "ten"}}"#).is_err());
    assert!(decode(r#"{"a.txt": 5}"#).is_err());
}

/// Empty stores encode to an empty object and back
#[test]
fn test_empty_snapshot_round_trip() {
    let snapshot = Snapshot::new();
    let text = encode(&snapshot, false).unwrap();
    assert_eq!(text, "{}");
    assert!(decode(&text).unwrap().is_empty());
}
