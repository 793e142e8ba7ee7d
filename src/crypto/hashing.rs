//! SHA-256 hashing for the integrity ledger.
//!
//! Both hash forms produce base64 strings, and the exact byte layouts
//! fed to the digest are wire format: changing either silently breaks
//! verification of every previously-written chain.
//!
//! - payload hash: `SHA-256(iv_b64 + "." + ciphertext_b64)`
//! - entry hash: `SHA-256(canonical entry JSON)` (see the ledger module)

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sha2::{Digest, Sha256};

/// SHA-256 over raw bytes, returned as a base64 string.
pub fn sha256_b64(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    BASE64.encode(digest)
}

/// Hash an encrypted payload for ledger binding.
///
/// The input is the base64 IV and base64 ciphertext joined with a `.`,
/// hashed as UTF-8 bytes.
pub fn payload_hash_b64(iv_b64: &str, ciphertext_b64: &str) -> String {
    sha256_b64(format!("{iv_b64}.{ciphertext_b64}").as_bytes())
}
