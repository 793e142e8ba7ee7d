//! Tamper-evident append-only ledger.
//!
//! Every vault write appends one entry binding the encrypted payload
//! (by hash) to its predecessor (by hash), forming a chain anchored at
//! the `GENESIS` sentinel.  Editing, reordering, or removing an interior
//! entry breaks the chain at or after the touched position.
//!
//! Known limitation: the chain has no external anchor, so an attacker
//! who deletes a suffix and leaves the remaining prefix untouched — or
//! rewrites seq numbers and hashes self-consistently — produces a chain
//! that still verifies.  Verification proves the prefix is intact, not
//! that it is complete.
//!
//! `append_entry` is a pure function of its inputs.  The caller must
//! supply the *true* current last entry; the record store does so inside
//! a storage transaction so concurrent appends cannot race the
//! read-then-write.

use serde::{Deserialize, Serialize};

use crate::crypto::encryption::EncryptedPayload;
use crate::crypto::hashing::{payload_hash_b64, sha256_b64};
use crate::errors::{Result, VaultError};
use crate::vault::record::RecordKind;

/// `prev_hash` sentinel for the first entry in the chain.
pub const GENESIS: &str = "GENESIS";

/// One link in the hash chain.
///
/// Immutable after creation; entries are never rewritten or deleted
/// except by total vault destruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// 1-based position, strictly increasing by 1.
    pub seq: u64,

    /// Id of the record this entry audits.
    pub record_id: String,

    /// Kind of the audited record.
    pub kind: RecordKind,

    /// Write time, epoch milliseconds.
    pub created_at: i64,

    /// `entry_hash` of the previous entry, or `GENESIS`.
    pub prev_hash: String,

    /// SHA-256 of `iv_b64.ciphertext_b64` (base64).
    pub payload_hash: String,

    /// SHA-256 of the canonical form of the fields above (base64).
    pub entry_hash: String,
}

/// The canonical byte layout hashed into `entry_hash`.
///
/// Field names and order are wire format — they must never change, or
/// every previously-written chain stops verifying.
#[derive(Serialize)]
struct CanonicalEntry<'a> {
    seq: u64,
    #[serde(rename = "recordId")]
    record_id: &'a str,
    kind: RecordKind,
    #[serde(rename = "createdAt")]
    created_at: i64,
    #[serde(rename = "prevHash")]
    prev_hash: &'a str,
    #[serde(rename = "payloadHash")]
    payload_hash: &'a str,
}

fn entry_hash_b64(
    seq: u64,
    record_id: &str,
    kind: RecordKind,
    created_at: i64,
    prev_hash: &str,
    payload_hash: &str,
) -> Result<String> {
    let canonical = serde_json::to_vec(&CanonicalEntry {
        seq,
        record_id,
        kind,
        created_at,
        prev_hash,
        payload_hash,
    })
    .map_err(|e| VaultError::SerializationError(format!("canonical entry: {e}")))?;
    Ok(sha256_b64(&canonical))
}

/// Build the next chain entry after `prev`.
///
/// Pure: no hidden state, no storage access.  With `prev = None` this
/// produces the genesis entry (`seq = 1`, `prev_hash = GENESIS`).
pub fn append_entry(
    prev: Option<&LedgerEntry>,
    record_id: &str,
    kind: RecordKind,
    created_at: i64,
    payload: &EncryptedPayload,
) -> Result<LedgerEntry> {
    let payload_hash = payload_hash_b64(&payload.iv_b64(), &payload.ciphertext_b64());
    let seq = prev.map_or(1, |p| p.seq + 1);
    let prev_hash = prev.map_or_else(|| GENESIS.to_string(), |p| p.entry_hash.clone());

    let entry_hash = entry_hash_b64(seq, record_id, kind, created_at, &prev_hash, &payload_hash)?;

    Ok(LedgerEntry {
        seq,
        record_id: record_id.to_string(),
        kind,
        created_at,
        prev_hash,
        payload_hash,
        entry_hash,
    })
}

/// Walk the whole chain and recompute every link.
///
/// Entries are sorted by `seq` first, so storage order does not matter.
/// The first mismatch is reported as an `IntegrityViolation` carrying
/// the offending seq; a chain is only valid if every entry from first
/// to last checks out.  Violations are reported, never repaired.
pub fn verify_ledger(entries: &[LedgerEntry]) -> Result<()> {
    let mut sorted: Vec<&LedgerEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| e.seq);

    let mut prev: Option<&LedgerEntry> = None;
    for entry in sorted {
        let expected_prev = prev.map_or(GENESIS, |p| p.entry_hash.as_str());
        if entry.prev_hash != expected_prev {
            return Err(VaultError::IntegrityViolation {
                at_seq: entry.seq,
                reason: "prevHash mismatch".into(),
            });
        }

        let expected_hash = entry_hash_b64(
            entry.seq,
            &entry.record_id,
            entry.kind,
            entry.created_at,
            &entry.prev_hash,
            &entry.payload_hash,
        )?;
        if entry.entry_hash != expected_hash {
            return Err(VaultError::IntegrityViolation {
                at_seq: entry.seq,
                reason: "entryHash mismatch".into(),
            });
        }

        prev = Some(entry);
    }

    Ok(())
}
