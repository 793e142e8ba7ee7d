//! AES-256-GCM authenticated encryption of JSON values.
//!
//! Every value stored in the vault travels as an [`EncryptedPayload`]:
//! a versioned envelope holding a fresh random 12-byte IV and the
//! GCM ciphertext (plaintext + 16-byte auth tag).  The IV is drawn
//! fresh on every call and must never repeat under one key, which the
//! OS RNG guarantees to cryptographic certainty.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::crypto::keys::SessionKey;
use crate::errors::{Result, VaultError};

/// Size of the AES-256-GCM IV in bytes.
pub const IV_LEN: usize = 12;

/// Current envelope version.
pub const PAYLOAD_VERSION: u8 = 1;

/// A versioned AES-GCM envelope: IV + ciphertext, base64 in JSON.
///
/// The envelope is self-describing — it is the unit persisted in the
/// `records` table, embedded in the meta sentinel, and written out as
/// the backup artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedPayload {
    /// Envelope version (currently 1).
    pub version: u8,

    /// The 12-byte IV, fresh per encryption (base64 in JSON).
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub iv: Vec<u8>,

    /// The GCM ciphertext including the auth tag (base64 in JSON).
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub ciphertext: Vec<u8>,
}

impl EncryptedPayload {
    /// The IV as a base64 string — the form fed into payload hashing.
    pub fn iv_b64(&self) -> String {
        BASE64.encode(&self.iv)
    }

    /// The ciphertext as a base64 string — the form fed into payload hashing.
    pub fn ciphertext_b64(&self) -> String {
        BASE64.encode(&self.ciphertext)
    }
}

/// Serialize `value` as JSON and encrypt it under `key`.
pub fn encrypt_json<T: Serialize>(key: &SessionKey, value: &T) -> Result<EncryptedPayload> {
    let plaintext = serde_json::to_vec(value)
        .map_err(|e| VaultError::SerializationError(format!("plaintext: {e}")))?;

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext.as_slice())
        .map_err(|e| VaultError::EncryptionFailed(format!("encryption error: {e}")))?;

    Ok(EncryptedPayload {
        version: PAYLOAD_VERSION,
        iv: nonce.to_vec(),
        ciphertext,
    })
}

/// Decrypt an envelope and deserialize the JSON plaintext.
///
/// Unknown versions are rejected up front.  Every decryption or
/// authentication failure surfaces as the single `DecryptFailed` so the
/// error can never act as a wrong-key-vs-tampering oracle.  A payload
/// that decrypts but does not parse as `T` is `MalformedRecord`.
pub fn decrypt_json<T: DeserializeOwned>(key: &SessionKey, payload: &EncryptedPayload) -> Result<T> {
    if payload.version != PAYLOAD_VERSION {
        return Err(VaultError::UnsupportedVersion(payload.version));
    }
    if payload.iv.len() != IV_LEN {
        return Err(VaultError::DecryptFailed);
    }

    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| VaultError::DecryptFailed)?;
    let nonce = Nonce::from_slice(&payload.iv);

    let plaintext = cipher
        .decrypt(nonce, payload.ciphertext.as_slice())
        .map_err(|_| VaultError::DecryptFailed)?;

    serde_json::from_slice(&plaintext)
        .map_err(|e| VaultError::MalformedRecord(format!("payload JSON: {e}")))
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let encoded = BASE64.encode(data);
    serializer.serialize_str(&encoded)
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}
