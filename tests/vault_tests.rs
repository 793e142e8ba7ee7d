//! Integration tests for the vault session: lock state machine,
//! record lifecycle, re-keying, and destruction.

use havenvault::errors::VaultError;
use havenvault::session::VaultSession;
use havenvault::vault::meta::VaultMode;
use havenvault::vault::record::{
    ChatMessage, ChatTranscript, JournalEntry, RecordValue, TrustedContact, CONTACT_RECORD_ID,
};
use tempfile::TempDir;

/// Helper: a fresh vault database path inside a temp dir.
fn vault_path() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("haven.db");
    (dir, path)
}

fn journal(body: &str) -> RecordValue {
    RecordValue::Journal(JournalEntry {
        title: None,
        body: body.into(),
    })
}

// ---------------------------------------------------------------------------
// Device-mode lifecycle
// ---------------------------------------------------------------------------

#[test]
fn init_creates_and_reopening_preserves_the_vault() {
    let (_dir, path) = vault_path();

    let mut session = VaultSession::open(&path).unwrap();
    session.init().unwrap();
    assert!(session.is_unlocked());
    assert_eq!(session.mode(), VaultMode::Device);

    let record = session.put(&journal("first entry")).unwrap();
    drop(session);

    // A new session over the same file auto-unlocks and reads the record.
    let mut session = VaultSession::open(&path).unwrap();
    session.init().unwrap();
    assert!(session.is_unlocked());

    let value = session.get(&record.id).unwrap().unwrap();
    assert_eq!(value, journal("first entry"));
}

#[test]
fn put_on_a_locked_vault_is_rejected() {
    let mut session = VaultSession::open_in_memory().unwrap();
    session.init().unwrap();
    session.lock();

    let err = session.put(&journal("never stored")).unwrap_err();
    assert!(matches!(err, VaultError::VaultLocked));

    // The rejected write left no trace.
    assert!(session.list().unwrap().is_empty());
    assert!(session.ledger().unwrap().is_empty());
}

#[test]
fn typed_values_roundtrip() {
    let mut session = VaultSession::open_in_memory().unwrap();
    session.init().unwrap();

    let chat = RecordValue::Chat(ChatTranscript {
        messages: vec![
            ChatMessage {
                role: "user".into(),
                text: "rough week".into(),
                at: 1,
            },
            ChatMessage {
                role: "companion".into(),
                text: "tell me more".into(),
                at: 2,
            },
        ],
    });

    let record = session.put(&chat).unwrap();
    assert!(record.id.starts_with("chat_"));
    assert_eq!(session.get(&record.id).unwrap().unwrap(), chat);
}

// ---------------------------------------------------------------------------
// Contact upsert
// ---------------------------------------------------------------------------

#[test]
fn contact_upsert_keeps_one_record_but_audits_every_write() {
    let mut session = VaultSession::open_in_memory().unwrap();
    session.init().unwrap();

    session
        .upsert_contact(TrustedContact {
            name: "Sam".into(),
            handle: "+1-555-0100".into(),
        })
        .unwrap();
    session
        .upsert_contact(TrustedContact {
            name: "Sam".into(),
            handle: "+1-555-0199".into(),
        })
        .unwrap();

    let records = session.list().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, CONTACT_RECORD_ID);

    // Two writes, two ledger entries — overwrites are audited too.
    assert_eq!(session.ledger().unwrap().len(), 2);
    session.verify_integrity().unwrap();

    let contact = session.get_contact().unwrap().unwrap();
    assert_eq!(contact.handle, "+1-555-0199");
}

// ---------------------------------------------------------------------------
// Integrity
// ---------------------------------------------------------------------------

#[test]
fn ledger_verifies_after_a_burst_of_writes() {
    let mut session = VaultSession::open_in_memory().unwrap();
    session.init().unwrap();

    for i in 0..10 {
        session.put(&journal(&format!("entry {i}"))).unwrap();
    }

    let ledger = session.ledger().unwrap();
    assert_eq!(ledger.len(), 10);
    assert_eq!(ledger[0].seq, 1);
    assert_eq!(ledger[9].seq, 10);
    session.verify_integrity().unwrap();
}

// ---------------------------------------------------------------------------
// Passcode lifecycle
// ---------------------------------------------------------------------------

#[test]
fn set_passcode_rekeys_and_survives_reopen() {
    let (_dir, path) = vault_path();

    let mut session = VaultSession::open(&path).unwrap();
    session.init().unwrap();
    let r1 = session.put(&journal("before rekey")).unwrap();
    let r2 = session.put(&journal("also before")).unwrap();

    // Use the KDF floor so the test stays fast; the floor is enforced
    // either way.
    let count = session
        .set_passcode_with_iterations("orange-swallow-6", 100_000)
        .unwrap();
    assert_eq!(count, 2);
    assert_eq!(session.mode(), VaultMode::Passcode);

    // Still readable in the same session under the new key.
    assert_eq!(session.get(&r1.id).unwrap().unwrap(), journal("before rekey"));
    drop(session);

    // Reopen: no auto-unlock in passcode mode.
    let mut session = VaultSession::open(&path).unwrap();
    session.init().unwrap();
    assert!(!session.is_unlocked());
    assert!(matches!(
        session.get(&r1.id).unwrap_err(),
        VaultError::VaultLocked
    ));

    // Device unlock is the wrong mode now; the secret is gone.
    assert!(matches!(
        session.unlock_device().unwrap_err(),
        VaultError::WrongMode("device")
    ));

    // Wrong passcode is reported uniformly.
    assert!(matches!(
        session.unlock_with_passcode("wrong-passcode").unwrap_err(),
        VaultError::WrongPasscode
    ));
    assert!(!session.is_unlocked());

    // The right passcode restores access to every record.
    session.unlock_with_passcode("orange-swallow-6").unwrap();
    assert_eq!(session.get(&r1.id).unwrap().unwrap(), journal("before rekey"));
    assert_eq!(session.get(&r2.id).unwrap().unwrap(), journal("also before"));
    session.verify_integrity().unwrap();
}

#[test]
fn set_passcode_requires_an_unlocked_session() {
    let mut session = VaultSession::open_in_memory().unwrap();
    session.init().unwrap();
    session.lock();

    let err = session
        .set_passcode_with_iterations("irrelevant", 100_000)
        .unwrap_err();
    assert!(matches!(err, VaultError::VaultLocked));
}

#[test]
fn passcode_unlock_on_a_device_vault_is_wrong_mode() {
    let mut session = VaultSession::open_in_memory().unwrap();
    session.init().unwrap();

    let err = session.unlock_with_passcode("anything").unwrap_err();
    assert!(matches!(err, VaultError::WrongMode("passcode")));
}

// ---------------------------------------------------------------------------
// Destruction
// ---------------------------------------------------------------------------

#[test]
fn delete_everything_wipes_and_reinitializes() {
    let mut session = VaultSession::open_in_memory().unwrap();
    session.init().unwrap();

    let record = session.put(&journal("doomed")).unwrap();
    session
        .upsert_contact(TrustedContact {
            name: "Sam".into(),
            handle: "x".into(),
        })
        .unwrap();

    session.delete_everything().unwrap();

    // Fresh empty device-mode vault, already unlocked.
    assert!(session.is_unlocked());
    assert_eq!(session.mode(), VaultMode::Device);
    assert!(session.list().unwrap().is_empty());
    assert!(session.ledger().unwrap().is_empty());
    assert!(session.get(&record.id).unwrap().is_none());
    assert!(session.get_contact().unwrap().is_none());

    // And it accepts new writes immediately.
    session.put(&journal("fresh start")).unwrap();
    session.verify_integrity().unwrap();
}
