//! The vault meta singleton.
//!
//! Exactly one `VaultMeta` row exists (fixed id `vault`).  It records
//! which unlock mode the vault is in, the KDF parameters for passcode
//! mode, the raw device secret for device mode, and the encrypted
//! `check` sentinel used to validate any candidate key before the
//! session is marked unlocked.
//!
//! Created lazily on first use, mutated only by a re-key, destroyed
//! only by a full wipe.

use serde::{Deserialize, Serialize};

use crate::crypto::encryption::EncryptedPayload;

/// Fixed row id of the meta singleton.
pub const META_ID: &str = "vault";

/// How the vault key is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaultMode {
    /// Key is the stored random device secret; unlocks automatically.
    Device,
    /// Key is derived from a user passcode via PBKDF2.
    Passcode,
}

impl VaultMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Device => "device",
            Self::Passcode => "passcode",
        }
    }
}

/// The known-plaintext sentinel encrypted into `VaultMeta::check`.
///
/// Successfully decrypting this (and seeing `ok: true`) is what proves
/// a candidate key is the vault key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckValue {
    pub ok: bool,
    pub created_at: i64,
}

/// The meta singleton.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultMeta {
    pub mode: VaultMode,

    /// Epoch milliseconds.
    pub created_at: i64,

    /// PBKDF2 salt — passcode mode only (base64 in JSON).
    #[serde(default, skip_serializing_if = "Option::is_none", with = "opt_b64")]
    pub salt: Option<Vec<u8>>,

    /// PBKDF2 iteration count — passcode mode only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u32>,

    /// Raw 32-byte key — device mode only (base64 in JSON).
    #[serde(default, skip_serializing_if = "Option::is_none", with = "opt_b64")]
    pub device_secret: Option<Vec<u8>>,

    /// The encrypted key-validation sentinel.
    pub check: EncryptedPayload,
}

impl VaultMeta {
    /// Copy of this meta with the device secret removed.
    ///
    /// The secret never leaves the device; this is the form a backup
    /// carries.
    pub fn stripped_for_backup(&self) -> Self {
        Self {
            device_secret: None,
            ..self.clone()
        }
    }
}

/// Serde adapter: `Option<Vec<u8>>` as an optional base64 string.
mod opt_b64 {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(data: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match data {
            Some(bytes) => serializer.serialize_some(&BASE64.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: Option<String> = Option::deserialize(deserializer)?;
        match s {
            Some(text) => BASE64
                .decode(&text)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
