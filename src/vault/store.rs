//! High-level record operations over the vault database.
//!
//! `RecordStore` owns the orchestration the session delegates to:
//! encrypt → persist → ledger-append for writes, decrypt → validate for
//! reads, and the bulk re-encryption behind a passcode change.  Every
//! multi-step mutation runs inside a single SQLite transaction, which
//! is what enforces the two single-writer requirements: the ledger's
//! read-last-then-append, and re-key versus concurrent writes.

use crate::crypto::encryption::{decrypt_json, encrypt_json};
use crate::crypto::keys::SessionKey;
use crate::errors::{Result, VaultError};
use crate::ledger::{append_entry, verify_ledger, LedgerEntry};
use crate::vault::db::{self, VaultDb};
use crate::vault::meta::VaultMeta;
use crate::vault::now_millis;
use crate::vault::record::{
    new_record_id, RecordKind, RecordMetadata, RecordValue, TrustedContact, VaultRecord,
    CONTACT_RECORD_ID,
};

/// The record store: durable records + meta + ledger.
pub struct RecordStore {
    db: VaultDb,
}

impl RecordStore {
    pub fn new(db: VaultDb) -> Self {
        Self { db }
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Encrypt `value`, persist it as a record, and append one ledger
    /// entry chained from the true last entry.
    ///
    /// Contact values always target the fixed contact id (upsert); all
    /// other kinds get a fresh id.  An overwritten contact still gains
    /// a new ledger entry — the audit trail is append-only even for
    /// single-slot records.
    pub fn put(&mut self, key: &SessionKey, value: &RecordValue) -> Result<VaultRecord> {
        let kind = value.kind();
        let payload = encrypt_json(key, value)?;
        let created_at = now_millis();
        let id = match kind {
            RecordKind::Contact => CONTACT_RECORD_ID.to_string(),
            _ => new_record_id(kind),
        };

        let record = VaultRecord {
            id,
            kind,
            created_at,
            payload,
        };

        let tx = self.db.transaction()?;
        db::put_record(&tx, &record)?;
        let prev = db::last_ledger_entry(&tx)?;
        let entry = append_entry(prev.as_ref(), &record.id, kind, created_at, &record.payload)?;
        db::insert_ledger_entry(&tx, &entry)?;
        tx.commit()?;

        Ok(record)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Decrypt a record into its typed value, or `None` if absent.
    ///
    /// The decrypted tag must agree with the stored kind column; a
    /// mismatch means the row was rewritten out-of-band and is rejected.
    pub fn get(&self, key: &SessionKey, id: &str) -> Result<Option<RecordValue>> {
        let Some(record) = self.db.get_record(id)? else {
            return Ok(None);
        };

        let value: RecordValue = decrypt_json(key, &record.payload)?;
        if value.kind() != record.kind {
            return Err(VaultError::MalformedRecord(format!(
                "record '{id}' is stored as '{}' but decrypts as '{}'",
                record.kind,
                value.kind()
            )));
        }
        Ok(Some(value))
    }

    /// The trusted contact, if one has been stored.
    pub fn get_contact(&self, key: &SessionKey) -> Result<Option<TrustedContact>> {
        match self.get(key, CONTACT_RECORD_ID)? {
            None => Ok(None),
            Some(RecordValue::Contact(contact)) => Ok(Some(contact)),
            Some(other) => Err(VaultError::MalformedRecord(format!(
                "contact slot holds a '{}' record",
                other.kind()
            ))),
        }
    }

    /// Record metadata without touching any ciphertext.
    pub fn list(&self) -> Result<Vec<RecordMetadata>> {
        self.db.list_records()
    }

    /// All records in stored (encrypted) form, for backup.
    pub fn records_raw(&self) -> Result<Vec<VaultRecord>> {
        self.db.scan_records()
    }

    /// The full ledger in seq order.
    pub fn ledger(&self) -> Result<Vec<LedgerEntry>> {
        self.db.scan_ledger()
    }

    /// Walk the whole hash chain.
    pub fn verify_integrity(&self) -> Result<()> {
        verify_ledger(&self.ledger()?)
    }

    pub fn get_meta(&self) -> Result<Option<VaultMeta>> {
        self.db.get_meta()
    }

    pub fn put_meta(&self, meta: &VaultMeta) -> Result<()> {
        self.db.put_meta(meta)
    }

    // ------------------------------------------------------------------
    // Re-key
    // ------------------------------------------------------------------

    /// Re-encrypt every record under `new_key` and install `new_meta`,
    /// all in one transaction.
    ///
    /// The transaction is the atomicity boundary for the bulk rewrite:
    /// a crash mid-way rolls the vault back wholesale to the old key,
    /// and recovery is simply running the re-key again.  Ledger entries
    /// are untouched — they bind the ciphertext bytes that were live at
    /// append time, and rewriting them would destroy the audit trail.
    pub fn rekey(
        &mut self,
        old_key: &SessionKey,
        new_key: &SessionKey,
        new_meta: &VaultMeta,
    ) -> Result<usize> {
        let tx = self.db.transaction()?;

        let records = db::scan_records(&tx)?;
        let count = records.len();
        for mut record in records {
            let value: RecordValue = decrypt_json(old_key, &record.payload)?;
            record.payload = encrypt_json(new_key, &value)?;
            db::put_record(&tx, &record)?;
        }

        db::put_meta(&tx, new_meta)?;
        tx.commit()?;

        Ok(count)
    }

    // ------------------------------------------------------------------
    // Destruction and restore
    // ------------------------------------------------------------------

    /// Irreversibly destroy meta, records, and ledger.
    pub fn delete_everything(&mut self) -> Result<()> {
        let tx = self.db.transaction()?;
        db::wipe(&tx)?;
        tx.commit()?;
        Ok(())
    }

    /// Replace the entire vault contents (backup restore).
    pub fn restore(
        &mut self,
        meta: &VaultMeta,
        records: &[VaultRecord],
        ledger: &[LedgerEntry],
    ) -> Result<()> {
        let tx = self.db.transaction()?;
        db::wipe(&tx)?;
        db::put_meta(&tx, meta)?;
        for record in records {
            db::put_record(&tx, record)?;
        }
        for entry in ledger {
            db::insert_ledger_entry(&tx, entry)?;
        }
        tx.commit()?;
        Ok(())
    }
}
