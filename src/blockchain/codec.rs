//! Canonical block encoding used for chain linkage.
//!
//! A block's hash must be a function of its logical content only, so that a
//! chain fetched from a peer (whose JSON may list fields in any order)
//! re-hashes to exactly the values its `previous_hash` links recorded. The
//! encoding is:
//!
//! - the block is lowered to a JSON value tree;
//! - every object is written with its keys sorted by byte order, with no
//!   whitespace (`{"a":1,"b":2}`);
//! - arrays keep their order (transaction order is part of the content);
//! - scalars use serde_json's formatting, which round-trips `f64` exactly.
//!
//! The digest is SHA-256 over that UTF-8 text, rendered as lowercase hex.

use serde_json::Value;
use sha2::{Digest, Sha256};

use super::Block;

/// Canonical byte form of a block.
pub fn canonical_bytes(block: &Block) -> Vec<u8> {
    let value = serde_json::to_value(block).expect("block serializes to a JSON tree");
    let mut out = String::new();
    write_canonical(&value, &mut out);
    out.into_bytes()
}

/// Hex SHA-256 of [`canonical_bytes`].
pub fn canonical_hash(block: &Block) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_bytes(block));
    hex::encode(hasher.finalize())
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));

            out.push('{');
            for (i, (key, val)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(val, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
