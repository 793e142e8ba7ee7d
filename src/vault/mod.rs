//! Vault layer — record types, the meta singleton, SQLite persistence,
//! and the store that orchestrates encrypt → persist → ledger-append.

pub mod db;
pub mod meta;
pub mod record;
pub mod store;

pub use db::VaultDb;
pub use meta::{CheckValue, VaultMeta, VaultMode};
pub use record::{RecordKind, RecordMetadata, RecordValue, TrustedContact, VaultRecord};
pub use store::RecordStore;

/// Current time as epoch milliseconds.
///
/// Record and ledger timestamps are integers rather than formatted
/// strings so the canonical entry hashing stays byte-stable across
/// store/load round-trips.
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
