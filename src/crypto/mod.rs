//! Crypto layer — AES-256-GCM envelopes, PBKDF2 key derivation, hashing.

pub mod encryption;
pub mod hashing;
pub mod kdf;
pub mod keys;
