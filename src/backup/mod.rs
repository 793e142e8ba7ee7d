//! Encrypted vault backup — export and restore.
//!
//! A backup is the whole vault — meta, records (still individually
//! encrypted), and the full ledger — serialized and wrapped in one more
//! AES-GCM layer under the active session key.  The artifact is the
//! JSON envelope `{"version":1,"iv":...,"ciphertext":...}` and is safe
//! to write anywhere.
//!
//! The device secret is never exported.  For a passcode-mode vault the
//! bundle's salt + iterations make a restore self-contained given the
//! passcode.  For a device-mode vault the importing side must already
//! hold the key (which *is* the raw secret), so the secret is stamped
//! back into the restored meta from the supplied key.

use serde::{Deserialize, Serialize};

use crate::crypto::encryption::{decrypt_json, encrypt_json, EncryptedPayload};
use crate::crypto::keys::SessionKey;
use crate::errors::{Result, VaultError};
use crate::ledger::{verify_ledger, LedgerEntry};
use crate::vault::meta::{VaultMeta, VaultMode};
use crate::vault::record::VaultRecord;
use crate::vault::RecordStore;

/// Current backup bundle version.
pub const BACKUP_VERSION: u8 = 1;

/// The plaintext bundle inside a backup envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct BackupBundle {
    pub version: u8,
    /// RFC 3339 export timestamp.
    pub exported_at: String,
    /// Meta with the device secret stripped.
    pub meta: VaultMeta,
    /// Records in stored (encrypted) form.
    pub records: Vec<VaultRecord>,
    /// The full hash chain.
    pub ledger: Vec<LedgerEntry>,
}

/// Assemble and encrypt a backup of the whole vault.
pub fn export_backup(store: &RecordStore, key: &SessionKey) -> Result<Vec<u8>> {
    let meta = store
        .get_meta()?
        .ok_or_else(|| VaultError::CorruptMeta("cannot back up a vault with no meta".into()))?;

    let bundle = BackupBundle {
        version: BACKUP_VERSION,
        exported_at: chrono::Utc::now().to_rfc3339(),
        meta: meta.stripped_for_backup(),
        records: store.records_raw()?,
        ledger: store.ledger()?,
    };

    let envelope = encrypt_json(key, &bundle)?;
    serde_json::to_vec(&envelope)
        .map_err(|e| VaultError::SerializationError(format!("backup envelope: {e}")))
}

/// Decrypt a backup envelope and replace the vault contents with it.
///
/// Returns `(records, ledger entries)` restored.  The restored ledger
/// is verified before anything is written; a backup carrying a broken
/// chain is refused outright.
pub fn import_backup(
    store: &mut RecordStore,
    bytes: &[u8],
    key: &SessionKey,
) -> Result<(usize, usize)> {
    let envelope: EncryptedPayload = serde_json::from_slice(bytes)
        .map_err(|e| VaultError::InvalidBackup(format!("envelope JSON: {e}")))?;

    let bundle: BackupBundle = match decrypt_json(key, &envelope) {
        Ok(bundle) => bundle,
        Err(VaultError::MalformedRecord(e)) => {
            return Err(VaultError::InvalidBackup(format!("bundle JSON: {e}")))
        }
        Err(other) => return Err(other),
    };

    if bundle.version != BACKUP_VERSION {
        return Err(VaultError::InvalidBackup(format!(
            "unsupported bundle version {}",
            bundle.version
        )));
    }

    verify_ledger(&bundle.ledger)?;

    // The secret was stripped at export; in device mode the supplied
    // key is the secret, so the restored meta gets it back.
    let mut meta = bundle.meta;
    if meta.mode == VaultMode::Device {
        meta.device_secret = Some(key.as_bytes().to_vec());
    }

    store.restore(&meta, &bundle.records, &bundle.ledger)?;
    Ok((bundle.records.len(), bundle.ledger.len()))
}
