//! Hashing System - SHA-256 fingerprints for batch output
//!
//! Documents are hashed as written. Manifests and requests are hashed over
//! their canonical JSON form: object keys sorted, no whitespace.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;

/// Manifest key that holds the manifest's own hash
pub const MANIFEST_HASH_KEY: &str = "manifestHash";

pub fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .fold(String::with_capacity(64), |mut out, byte| {
            let _ = write!(out, "{:02x}", byte);
            out
        })
}

/// Serialize with object keys in byte order and no insignificant whitespace.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let mut out = String::new();
    write_canonical(&serde_json::to_value(value)?, &mut out)?;
    Ok(out)
}

fn write_canonical(value: &Value, out: &mut String) -> Result<(), serde_json::Error> {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(key)?);
                out.push(':');
                write_canonical(&map[key.as_str()], out)?;
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out)?;
            }
            out.push(']');
        }
        scalar => out.push_str(&serde_json::to_string(scalar)?),
    }
    Ok(())
}

/// Hash of a manifest, excluding its own `manifestHash` entry.
///
/// Works on the in-memory batch as well as on a `manifest.json` read back
/// from disk, so a written batch can be re-verified.
pub fn compute_manifest_hash<T: Serialize>(manifest: &T) -> Result<String, serde_json::Error> {
    let mut value = serde_json::to_value(manifest)?;
    if let Value::Object(map) = &mut value {
        map.remove(MANIFEST_HASH_KEY);
    }
    Ok(sha256_hex(canonical_json(&value)?.as_bytes()))
}

/// Fingerprint of what was asked for, independent of the random outcome.
/// request_hash = sha256(catalog_version : canonical_request : engine_version)
pub fn compute_request_hash(
    request: &impl Serialize,
    catalog_version: &str,
    engine_version: &str,
) -> Result<String, serde_json::Error> {
    let combined = format!("{}:{}:{}", catalog_version, canonical_json(request)?, engine_version);
    Ok(sha256_hex(combined.as_bytes()))
}
