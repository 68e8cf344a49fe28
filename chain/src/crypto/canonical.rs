//! Canonical byte encoding for hashing and signing.
//!
//! Every value that gets hashed or signed in this crate goes through
//! [`canonical_bytes`]. The contract is: UTF-8 JSON, keys sorted
//! lexicographically, and the minimal separators `","` / `":"` — matching
//! `json.dumps(..., sort_keys=True, separators=(',', ':'))` byte for byte.
//!
//! `serde_json::Value::Object` is backed by a `BTreeMap` as long as the
//! `preserve_order` feature is off (it is, here), so serializing any
//! `Serialize` value through `serde_json::to_value` and then back out
//! already sorts object keys for free; we only need to pick the compact
//! separators ourselves.

use serde::Serialize;

/// Encodes `value` as canonical JSON bytes: UTF-8, sorted keys, minimal
/// separators.
///
/// `serde_json::to_vec` already writes the minimal `","`/`":"` separators
/// (no pretty-printing); the only thing we need to add is key sorting,
/// which falls out for free by round-tripping through `serde_json::Value`
/// as long as the `preserve_order` cargo feature stays off, so
/// `Value::Object` stays backed by a `BTreeMap`.
///
/// # Panics
///
/// Panics if `value` cannot be serialized. Every type in this crate that is
/// passed to `canonical_bytes` is a plain data struct with a derived
/// `Serialize` impl, so this is a programming error, never a runtime one.
pub fn canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    let as_value = serde_json::to_value(value).expect("value should always serialize to JSON");
    serde_json::to_vec(&as_value).expect("canonical JSON re-serialization should not fail")
}

/// Convenience wrapper returning the canonical encoding as a `String`.
pub fn canonical_string<T: Serialize>(value: &T) -> String {
    String::from_utf8(canonical_bytes(value)).expect("canonical JSON is always valid UTF-8")
}
