//! Session key wrapper.
//!
//! A [`SessionKey`] holds the single 32-byte AES-256-GCM key active for
//! an unlocked vault session — either imported from the stored device
//! secret or derived from a passcode via PBKDF2.  The bytes are zeroed
//! when the wrapper drops so key material cannot linger in memory.

use zeroize::Zeroize;

use crate::errors::{Result, VaultError};

/// Length of the session key in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// A 32-byte AES key that zeroes its memory on drop.
#[derive(Debug, Zeroize)]
#[zeroize(drop)]
pub struct SessionKey {
    bytes: [u8; KEY_LEN],
}

impl SessionKey {
    /// Wrap raw key bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Import a stored device secret as a key.
    ///
    /// The secret must be exactly 32 bytes; anything else means the
    /// stored meta has been damaged.
    pub fn from_device_secret(secret: &[u8]) -> Result<Self> {
        let bytes: [u8; KEY_LEN] = secret
            .try_into()
            .map_err(|_| VaultError::CorruptMeta(format!(
                "device secret must be {KEY_LEN} bytes, found {}",
                secret.len()
            )))?;
        Ok(Self { bytes })
    }

    /// Access the raw key bytes (to build the AES cipher).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}
