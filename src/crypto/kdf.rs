//! Passcode-based key derivation using PBKDF2-HMAC-SHA256.
//!
//! The derivation parameters live in the vault meta so the exact same
//! key is reproduced at every unlock.  The iteration floor is a hard
//! precondition — deriving with fewer iterations fails fast instead of
//! silently producing a weakly-protected key.

use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

use crate::crypto::keys::{SessionKey, KEY_LEN};
use crate::errors::{Result, VaultError};

/// Length of the passcode salt in bytes.
pub const SALT_LEN: usize = 16;

/// Length of the device secret in bytes.
pub const DEVICE_SECRET_LEN: usize = 32;

/// Hard lower bound on PBKDF2 iterations.
pub const MIN_ITERATIONS: u32 = 100_000;

/// Iteration count used when setting a new passcode.
pub const REKEY_ITERATIONS: u32 = 210_000;

/// Derive a 256-bit AES key from a passcode, salt, and iteration count.
///
/// The same passcode + salt + iterations always produce the same key.
pub fn derive_key(passcode: &str, salt: &[u8], iterations: u32) -> Result<SessionKey> {
    if iterations < MIN_ITERATIONS {
        return Err(VaultError::KeyDerivationFailed(format!(
            "PBKDF2 iterations must be at least {MIN_ITERATIONS} (got {iterations})"
        )));
    }
    if salt.is_empty() {
        return Err(VaultError::KeyDerivationFailed(
            "PBKDF2 salt must not be empty".into(),
        ));
    }

    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(passcode.as_bytes(), salt, iterations, &mut key);
    Ok(SessionKey::new(key))
}

/// Generate a cryptographically random 16-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Generate a cryptographically random 32-byte device secret.
pub fn generate_device_secret() -> [u8; DEVICE_SECRET_LEN] {
    let mut secret = [0u8; DEVICE_SECRET_LEN];
    OsRng.fill_bytes(&mut secret);
    secret
}
