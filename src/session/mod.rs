//! Vault session — the lock/unlock state machine and key lifecycle.
//!
//! A [`VaultSession`] is an explicit object constructed once and passed
//! by reference to everything that needs the vault; there is no global
//! state.  It starts locked, holds the active key only while unlocked,
//! and gates every write on the lock state and on any in-flight re-key.
//!
//! Idle locking is the caller's policy: a host application polls
//! [`VaultSession::lock_if_idle`] (every couple of seconds is plenty —
//! jitter up to the poll interval is fine) and calls `touch` on user
//! activity.

use std::path::Path;
use std::time::{Duration, Instant};

use zeroize::Zeroizing;

use crate::backup;
use crate::crypto::encryption::{decrypt_json, encrypt_json};
use crate::crypto::kdf::{derive_key, generate_device_secret, generate_salt, REKEY_ITERATIONS};
use crate::crypto::keys::SessionKey;
use crate::errors::{Result, VaultError};
use crate::ledger::LedgerEntry;
use crate::vault::meta::{CheckValue, VaultMeta, VaultMode};
use crate::vault::now_millis;
use crate::vault::record::{RecordMetadata, RecordValue, TrustedContact, VaultRecord};
use crate::vault::{RecordStore, VaultDb};

/// Lock state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Locked,
    Unlocked,
}

/// An open vault with its lock state machine.
pub struct VaultSession {
    store: RecordStore,
    status: SessionStatus,
    mode: VaultMode,
    key: Option<SessionKey>,
    last_active_at: Instant,
    rekeying: bool,
}

impl VaultSession {
    /// Open the vault database at `path`; the session starts locked.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::from_db(VaultDb::open(path)?))
    }

    /// In-memory vault (tests and embedding).
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_db(VaultDb::open_in_memory()?))
    }

    fn from_db(db: VaultDb) -> Self {
        Self {
            store: RecordStore::new(db),
            status: SessionStatus::Locked,
            mode: VaultMode::Device,
            key: None,
            last_active_at: Instant::now(),
            rekeying: false,
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Ensure the vault exists and, in device mode, unlock it.
    ///
    /// On first use this creates a fresh device-mode vault: a random
    /// 32-byte secret and an encrypted sentinel.  A passcode-mode vault
    /// stays locked until `unlock_with_passcode`.
    pub fn init(&mut self) -> Result<()> {
        let meta = self.ensure_meta()?;
        self.mode = meta.mode;
        if meta.mode == VaultMode::Device {
            self.unlock_device()?;
        }
        Ok(())
    }

    fn ensure_meta(&mut self) -> Result<VaultMeta> {
        if let Some(meta) = self.store.get_meta()? {
            return Ok(meta);
        }

        let secret = Zeroizing::new(generate_device_secret());
        let key = SessionKey::new(*secret);
        let created_at = now_millis();
        let check = encrypt_json(&key, &CheckValue { ok: true, created_at })?;

        let meta = VaultMeta {
            mode: VaultMode::Device,
            created_at,
            salt: None,
            iterations: None,
            device_secret: Some(secret.to_vec()),
            check,
        };
        self.store.put_meta(&meta)?;
        Ok(meta)
    }

    /// Unlock using the stored device secret.
    ///
    /// Only valid in device mode.  A sentinel that will not decrypt
    /// under the stored secret means the meta itself is damaged — that
    /// is fatal, not retryable.
    pub fn unlock_device(&mut self) -> Result<()> {
        let meta = self.require_meta()?;
        if meta.mode != VaultMode::Device {
            return Err(VaultError::WrongMode("device"));
        }

        let secret = meta
            .device_secret
            .as_deref()
            .ok_or_else(|| VaultError::CorruptMeta("device mode without a device secret".into()))?;
        let key = SessionKey::from_device_secret(secret)?;

        let check: CheckValue = decrypt_json(&key, &meta.check)
            .map_err(|_| VaultError::CorruptMeta("sentinel does not decrypt".into()))?;
        if !check.ok {
            return Err(VaultError::CorruptMeta("sentinel check failed".into()));
        }

        self.unlock_with(key, VaultMode::Device);
        Ok(())
    }

    /// Unlock by deriving a key from `passcode`.
    ///
    /// Any sentinel failure — wrong key, tampered meta — is reported
    /// uniformly as `WrongPasscode` so the caller cannot use the error
    /// to tell the causes apart.
    pub fn unlock_with_passcode(&mut self, passcode: &str) -> Result<()> {
        let meta = self.require_meta()?;
        if meta.mode != VaultMode::Passcode {
            return Err(VaultError::WrongMode("passcode"));
        }

        let salt = meta
            .salt
            .as_deref()
            .ok_or_else(|| VaultError::CorruptMeta("passcode mode without a salt".into()))?;
        let iterations = meta
            .iterations
            .ok_or_else(|| VaultError::CorruptMeta("passcode mode without iterations".into()))?;

        let key = derive_key(passcode, salt, iterations)?;
        let check: CheckValue =
            decrypt_json(&key, &meta.check).map_err(|_| VaultError::WrongPasscode)?;
        if !check.ok {
            return Err(VaultError::WrongPasscode);
        }

        self.unlock_with(key, VaultMode::Passcode);
        Ok(())
    }

    fn unlock_with(&mut self, key: SessionKey, mode: VaultMode) {
        self.key = Some(key);
        self.mode = mode;
        self.status = SessionStatus::Unlocked;
        self.touch();
    }

    /// Switch the vault to passcode mode under a new passcode.
    ///
    /// Generates a fresh salt, derives the new key at the fixed re-key
    /// iteration count, re-encrypts every record plus the sentinel, and
    /// discards the device secret — all behind the store's single
    /// transaction.  Writes racing an in-flight re-key get `VaultBusy`.
    pub fn set_passcode(&mut self, passcode: &str) -> Result<usize> {
        self.set_passcode_with_iterations(passcode, REKEY_ITERATIONS)
    }

    /// `set_passcode` with a caller-chosen iteration count (still
    /// subject to the KDF's hard floor).
    pub fn set_passcode_with_iterations(&mut self, passcode: &str, iterations: u32) -> Result<usize> {
        if self.rekeying {
            return Err(VaultError::VaultBusy);
        }
        let old_key = self.key.as_ref().ok_or(VaultError::VaultLocked)?;
        let meta = self.require_meta()?;

        let salt = generate_salt();
        let new_key = derive_key(passcode, &salt, iterations)?;
        let check = encrypt_json(&new_key, &CheckValue { ok: true, created_at: now_millis() })?;

        let new_meta = VaultMeta {
            mode: VaultMode::Passcode,
            created_at: meta.created_at,
            salt: Some(salt.to_vec()),
            iterations: Some(iterations),
            device_secret: None,
            check,
        };

        self.rekeying = true;
        let result = self.store.rekey(old_key, &new_key, &new_meta);
        self.rekeying = false;
        let count = result?;

        self.unlock_with(new_key, VaultMode::Passcode);
        Ok(count)
    }

    /// Drop the key and lock the session.
    pub fn lock(&mut self) {
        self.status = SessionStatus::Locked;
        self.key = None; // SessionKey zeroizes on drop.
    }

    /// Record caller activity for the idle policy.
    pub fn touch(&mut self) {
        self.last_active_at = Instant::now();
    }

    /// Lock if no activity for `max_idle`; returns whether it locked.
    pub fn lock_if_idle(&mut self, max_idle: Duration) -> bool {
        if self.status == SessionStatus::Unlocked && self.last_active_at.elapsed() >= max_idle {
            self.lock();
            return true;
        }
        false
    }

    // ------------------------------------------------------------------
    // Records
    // ------------------------------------------------------------------

    /// Encrypt and store a value, appending its ledger entry.
    pub fn put(&mut self, value: &RecordValue) -> Result<VaultRecord> {
        if self.rekeying {
            return Err(VaultError::VaultBusy);
        }
        let key = self.key.as_ref().ok_or(VaultError::VaultLocked)?;
        let record = self.store.put(key, value)?;
        self.touch();
        Ok(record)
    }

    /// Decrypt a record by id.
    pub fn get(&mut self, id: &str) -> Result<Option<RecordValue>> {
        let key = self.key.as_ref().ok_or(VaultError::VaultLocked)?;
        let value = self.store.get(key, id)?;
        self.touch();
        Ok(value)
    }

    /// Store (or replace) the single trusted contact.
    pub fn upsert_contact(&mut self, contact: TrustedContact) -> Result<VaultRecord> {
        self.put(&RecordValue::Contact(contact))
    }

    /// The trusted contact, if any.
    pub fn get_contact(&mut self) -> Result<Option<TrustedContact>> {
        let key = self.key.as_ref().ok_or(VaultError::VaultLocked)?;
        let contact = self.store.get_contact(key)?;
        self.touch();
        Ok(contact)
    }

    /// Record metadata without decrypting anything.
    pub fn list(&self) -> Result<Vec<RecordMetadata>> {
        self.store.list()
    }

    /// The full ledger (public hashes only — no unlock required).
    pub fn ledger(&self) -> Result<Vec<LedgerEntry>> {
        self.store.ledger()
    }

    /// Verify the hash chain.  Works on a locked vault: the ledger
    /// holds no plaintext.
    pub fn verify_integrity(&self) -> Result<()> {
        self.store.verify_integrity()
    }

    // ------------------------------------------------------------------
    // Backup and destruction
    // ------------------------------------------------------------------

    /// Serialize the whole vault into one encrypted envelope.
    pub fn export_backup(&mut self) -> Result<Vec<u8>> {
        let key = self.key.as_ref().ok_or(VaultError::VaultLocked)?;
        let bytes = backup::export_backup(&self.store, key)?;
        self.touch();
        Ok(bytes)
    }

    /// Restore a backup produced by [`Self::export_backup`] using the
    /// current session key, replacing the entire vault contents, then
    /// re-initialize from the restored meta.
    pub fn import_backup(&mut self, bytes: &[u8]) -> Result<(usize, usize)> {
        if self.rekeying {
            return Err(VaultError::VaultBusy);
        }
        let key = self.key.as_ref().ok_or(VaultError::VaultLocked)?;
        let counts = backup::import_backup(&mut self.store, bytes, key)?;
        self.lock();
        self.init()?;
        Ok(counts)
    }

    /// Restore a backup encrypted under an explicitly supplied key
    /// (e.g. built from another vault's device secret).
    pub fn import_backup_with_key(
        &mut self,
        bytes: &[u8],
        key: &SessionKey,
    ) -> Result<(usize, usize)> {
        if self.rekeying {
            return Err(VaultError::VaultBusy);
        }
        let counts = backup::import_backup(&mut self.store, bytes, key)?;
        self.lock();
        self.init()?;
        Ok(counts)
    }

    /// Irreversibly destroy everything, then re-initialize a brand-new
    /// empty device-mode vault.
    pub fn delete_everything(&mut self) -> Result<()> {
        self.store.delete_everything()?;
        self.lock();
        self.init()
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_unlocked(&self) -> bool {
        self.status == SessionStatus::Unlocked
    }

    pub fn mode(&self) -> VaultMode {
        self.mode
    }

    pub fn last_active_at(&self) -> Instant {
        self.last_active_at
    }

    fn require_meta(&self) -> Result<VaultMeta> {
        self.store
            .get_meta()?
            .ok_or_else(|| VaultError::CorruptMeta("vault has no meta — run init first".into()))
    }
}
