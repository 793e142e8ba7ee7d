//! SQLite persistence for the three vault tables.
//!
//! - `meta`: the singleton (`id = 'vault'`), stored as one JSON column.
//! - `records`: encrypted records keyed by id.
//! - `ledger`: hash-chain entries keyed by seq.
//!
//! The row helpers are free functions over `&Connection` so the store
//! can run them either directly or inside a transaction — the
//! transaction is what makes the ledger's read-last-then-append and the
//! bulk re-key single-writer safe.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::crypto::encryption::EncryptedPayload;
use crate::errors::{Result, VaultError};
use crate::ledger::LedgerEntry;
use crate::vault::meta::{VaultMeta, META_ID};
use crate::vault::record::{RecordKind, RecordMetadata, VaultRecord};

/// Handle to the vault database.
pub struct VaultDb {
    conn: Connection,
}

impl VaultDb {
    /// Open (or create) the vault database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Restrict the database file to the owner.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(path, perms);
        }

        create_tables(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (tests and embedding).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        create_tables(&conn)?;
        Ok(Self { conn })
    }

    /// Begin a transaction over the underlying connection.
    pub fn transaction(&mut self) -> Result<rusqlite::Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }

    pub fn get_meta(&self) -> Result<Option<VaultMeta>> {
        get_meta(&self.conn)
    }

    pub fn put_meta(&self, meta: &VaultMeta) -> Result<()> {
        put_meta(&self.conn, meta)
    }

    pub fn get_record(&self, id: &str) -> Result<Option<VaultRecord>> {
        get_record(&self.conn, id)
    }

    pub fn put_record(&self, record: &VaultRecord) -> Result<()> {
        put_record(&self.conn, record)
    }

    pub fn scan_records(&self) -> Result<Vec<VaultRecord>> {
        scan_records(&self.conn)
    }

    pub fn list_records(&self) -> Result<Vec<RecordMetadata>> {
        list_records(&self.conn)
    }

    pub fn last_ledger_entry(&self) -> Result<Option<LedgerEntry>> {
        last_ledger_entry(&self.conn)
    }

    pub fn scan_ledger(&self) -> Result<Vec<LedgerEntry>> {
        scan_ledger(&self.conn)
    }
}

fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS meta (
            id   TEXT PRIMARY KEY,
            json TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS records (
            id         TEXT PRIMARY KEY,
            kind       TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            payload    TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS ledger (
            seq          INTEGER PRIMARY KEY,
            record_id    TEXT NOT NULL,
            kind         TEXT NOT NULL,
            created_at   INTEGER NOT NULL,
            prev_hash    TEXT NOT NULL,
            payload_hash TEXT NOT NULL,
            entry_hash   TEXT NOT NULL
        );",
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// meta
// ---------------------------------------------------------------------------

pub(crate) fn get_meta(conn: &Connection) -> Result<Option<VaultMeta>> {
    let json: Option<String> = conn
        .query_row("SELECT json FROM meta WHERE id = ?1", params![META_ID], |row| {
            row.get(0)
        })
        .optional()?;

    match json {
        Some(text) => serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| VaultError::CorruptMeta(format!("meta JSON: {e}"))),
        None => Ok(None),
    }
}

pub(crate) fn put_meta(conn: &Connection, meta: &VaultMeta) -> Result<()> {
    let json = serde_json::to_string(meta)
        .map_err(|e| VaultError::SerializationError(format!("meta: {e}")))?;
    conn.execute(
        "INSERT OR REPLACE INTO meta (id, json) VALUES (?1, ?2)",
        params![META_ID, json],
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// records
// ---------------------------------------------------------------------------

pub(crate) fn get_record(conn: &Connection, id: &str) -> Result<Option<VaultRecord>> {
    let row: Option<(String, String, i64, String)> = conn
        .query_row(
            "SELECT id, kind, created_at, payload FROM records WHERE id = ?1",
            params![id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .optional()?;

    row.map(record_from_row).transpose()
}

pub(crate) fn put_record(conn: &Connection, record: &VaultRecord) -> Result<()> {
    let payload = serde_json::to_string(&record.payload)
        .map_err(|e| VaultError::SerializationError(format!("record payload: {e}")))?;
    conn.execute(
        "INSERT OR REPLACE INTO records (id, kind, created_at, payload)
         VALUES (?1, ?2, ?3, ?4)",
        params![record.id, record.kind.as_str(), record.created_at, payload],
    )?;
    Ok(())
}

pub(crate) fn scan_records(conn: &Connection) -> Result<Vec<VaultRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, kind, created_at, payload FROM records ORDER BY created_at, id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
    })?;

    let mut records = Vec::new();
    for row in rows {
        records.push(record_from_row(row?)?);
    }
    Ok(records)
}

pub(crate) fn list_records(conn: &Connection) -> Result<Vec<RecordMetadata>> {
    let mut stmt =
        conn.prepare("SELECT id, kind, created_at FROM records ORDER BY created_at, id")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get(2)?))
    })?;

    let mut list = Vec::new();
    for row in rows {
        let (id, kind, created_at) = row?;
        list.push(RecordMetadata {
            id,
            kind: kind.parse::<RecordKind>()?,
            created_at,
        });
    }
    Ok(list)
}

fn record_from_row((id, kind, created_at, payload): (String, String, i64, String)) -> Result<VaultRecord> {
    let kind = kind.parse::<RecordKind>()?;
    let payload: EncryptedPayload = serde_json::from_str(&payload)
        .map_err(|e| VaultError::SerializationError(format!("record '{id}' payload: {e}")))?;
    Ok(VaultRecord {
        id,
        kind,
        created_at,
        payload,
    })
}

// ---------------------------------------------------------------------------
// ledger
// ---------------------------------------------------------------------------

type LedgerRow = (i64, String, String, i64, String, String, String);

pub(crate) fn last_ledger_entry(conn: &Connection) -> Result<Option<LedgerEntry>> {
    let row: Option<LedgerRow> = conn
        .query_row(
            "SELECT seq, record_id, kind, created_at, prev_hash, payload_hash, entry_hash
             FROM ledger ORDER BY seq DESC LIMIT 1",
            [],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                ))
            },
        )
        .optional()?;

    row.map(ledger_entry_from_row).transpose()
}

pub(crate) fn insert_ledger_entry(conn: &Connection, entry: &LedgerEntry) -> Result<()> {
    conn.execute(
        "INSERT INTO ledger (seq, record_id, kind, created_at, prev_hash, payload_hash, entry_hash)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            entry.seq as i64,
            entry.record_id,
            entry.kind.as_str(),
            entry.created_at,
            entry.prev_hash,
            entry.payload_hash,
            entry.entry_hash,
        ],
    )?;
    Ok(())
}

pub(crate) fn scan_ledger(conn: &Connection) -> Result<Vec<LedgerEntry>> {
    let mut stmt = conn.prepare(
        "SELECT seq, record_id, kind, created_at, prev_hash, payload_hash, entry_hash
         FROM ledger ORDER BY seq",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
        ))
    })?;

    let mut entries = Vec::new();
    for row in rows {
        entries.push(ledger_entry_from_row(row?)?);
    }
    Ok(entries)
}

fn ledger_entry_from_row(
    (seq, record_id, kind, created_at, prev_hash, payload_hash, entry_hash): LedgerRow,
) -> Result<LedgerEntry> {
    Ok(LedgerEntry {
        seq: seq as u64,
        record_id,
        kind: kind.parse::<RecordKind>()?,
        created_at,
        prev_hash,
        payload_hash,
        entry_hash,
    })
}

// ---------------------------------------------------------------------------
// wipe
// ---------------------------------------------------------------------------

pub(crate) fn wipe(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "DELETE FROM meta;
         DELETE FROM records;
         DELETE FROM ledger;",
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::encryption::PAYLOAD_VERSION;
    use crate::ledger::append_entry;
    use crate::vault::meta::VaultMode;
    use tempfile::TempDir;

    fn sample_record(id: &str) -> VaultRecord {
        VaultRecord {
            id: id.into(),
            kind: RecordKind::Journal,
            created_at: 42,
            payload: EncryptedPayload {
                version: PAYLOAD_VERSION,
                iv: vec![0u8; 12],
                ciphertext: vec![1, 2, 3],
            },
        }
    }

    #[test]
    fn open_creates_database_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("haven.db");
        let _db = VaultDb::open(&path).unwrap();
        assert!(path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn database_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("haven.db");
        let _db = VaultDb::open(&path).unwrap();

        let perms = std::fs::metadata(&path).unwrap().permissions();
        assert_eq!(perms.mode() & 0o777, 0o600);
    }

    #[test]
    fn meta_roundtrip() {
        let db = VaultDb::open_in_memory().unwrap();
        assert!(db.get_meta().unwrap().is_none());

        let meta = VaultMeta {
            mode: VaultMode::Device,
            created_at: 7,
            salt: None,
            iterations: None,
            device_secret: Some(vec![5u8; 32]),
            check: sample_record("x").payload,
        };
        db.put_meta(&meta).unwrap();

        let loaded = db.get_meta().unwrap().unwrap();
        assert_eq!(loaded.mode, VaultMode::Device);
        assert_eq!(loaded.device_secret, Some(vec![5u8; 32]));
    }

    #[test]
    fn record_roundtrip_and_listing() {
        let db = VaultDb::open_in_memory().unwrap();
        db.put_record(&sample_record("journal_aa")).unwrap();
        db.put_record(&sample_record("journal_bb")).unwrap();

        let loaded = db.get_record("journal_aa").unwrap().unwrap();
        assert_eq!(loaded.kind, RecordKind::Journal);
        assert!(db.get_record("missing").unwrap().is_none());

        assert_eq!(db.list_records().unwrap().len(), 2);
        assert_eq!(db.scan_records().unwrap().len(), 2);
    }

    #[test]
    fn upsert_replaces_by_id() {
        let db = VaultDb::open_in_memory().unwrap();
        let mut record = sample_record("contact_default");
        db.put_record(&record).unwrap();
        record.payload.ciphertext = vec![9, 9];
        db.put_record(&record).unwrap();

        assert_eq!(db.list_records().unwrap().len(), 1);
        let loaded = db.get_record("contact_default").unwrap().unwrap();
        assert_eq!(loaded.payload.ciphertext, vec![9, 9]);
    }

    #[test]
    fn ledger_append_and_scan() {
        let db = VaultDb::open_in_memory().unwrap();
        assert!(db.last_ledger_entry().unwrap().is_none());

        let payload = sample_record("x").payload;
        let e1 = append_entry(None, "r1", RecordKind::Chat, 1, &payload).unwrap();
        insert_ledger_entry(&db.conn, &e1).unwrap();
        let e2 = append_entry(Some(&e1), "r2", RecordKind::Chat, 2, &payload).unwrap();
        insert_ledger_entry(&db.conn, &e2).unwrap();

        let last = db.last_ledger_entry().unwrap().unwrap();
        assert_eq!(last.seq, 2);

        let all = db.scan_ledger().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].seq, 1);
    }

    #[test]
    fn wipe_clears_all_tables() {
        let db = VaultDb::open_in_memory().unwrap();
        db.put_record(&sample_record("journal_aa")).unwrap();
        let payload = sample_record("x").payload;
        let e1 = append_entry(None, "r1", RecordKind::Chat, 1, &payload).unwrap();
        insert_ledger_entry(&db.conn, &e1).unwrap();

        wipe(&db.conn).unwrap();
        assert!(db.scan_records().unwrap().is_empty());
        assert!(db.scan_ledger().unwrap().is_empty());
        assert!(db.get_meta().unwrap().is_none());
    }
}
