//! Record types stored inside the vault.
//!
//! A [`VaultRecord`] is the persisted form: an id, a kind, a creation
//! timestamp, and the encrypted payload.  The plaintext behind the
//! payload is the tagged union [`RecordValue`], validated by serde
//! immediately after decryption so a record that decrypts fine but has
//! the wrong shape is rejected explicitly rather than trusted at use
//! time.

use std::fmt;
use std::str::FromStr;

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::crypto::encryption::EncryptedPayload;
use crate::errors::{Result, VaultError};

/// Fixed id for the single-slot trusted contact record.
///
/// Writing a contact always targets this id (upsert); every other kind
/// gets a fresh id and is append-only.
pub const CONTACT_RECORD_ID: &str = "contact_default";

/// The five record kinds the vault protects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Chat,
    Voice,
    Journal,
    Checkin,
    Contact,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Voice => "voice",
            Self::Journal => "journal",
            Self::Checkin => "checkin",
            Self::Contact => "contact",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "chat" => Ok(Self::Chat),
            "voice" => Ok(Self::Voice),
            "journal" => Ok(Self::Journal),
            "checkin" => Ok(Self::Checkin),
            "contact" => Ok(Self::Contact),
            other => Err(VaultError::CommandFailed(format!(
                "unknown record kind '{other}' — expected chat, voice, journal, checkin, or contact"
            ))),
        }
    }
}

/// One message inside a chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who spoke: "user" or "companion".
    pub role: String,
    pub text: String,
    /// Epoch milliseconds.
    pub at: i64,
}

/// A saved chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTranscript {
    pub messages: Vec<ChatMessage>,
}

/// A saved voice-session transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceTranscript {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// A journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub body: String,
}

/// A mood check-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
    /// Mood on the caller's scale (e.g. 1–5).
    pub mood: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// The single trusted contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustedContact {
    pub name: String,
    pub handle: String,
}

/// Plaintext record payload, tagged by kind.
///
/// This is what actually gets encrypted into a record's payload.  The
/// tag doubles as the schema check: decrypting into `RecordValue` and
/// comparing the tag against the record's stored kind catches both
/// malformed payloads and kind/payload mismatches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RecordValue {
    Chat(ChatTranscript),
    Voice(VoiceTranscript),
    Journal(JournalEntry),
    Checkin(CheckIn),
    Contact(TrustedContact),
}

impl RecordValue {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Chat(_) => RecordKind::Chat,
            Self::Voice(_) => RecordKind::Voice,
            Self::Journal(_) => RecordKind::Journal,
            Self::Checkin(_) => RecordKind::Checkin,
            Self::Contact(_) => RecordKind::Contact,
        }
    }

    /// Build a tagged value from a kind and an untagged JSON object.
    ///
    /// Used by the CLI, where the kind arrives as its own argument and
    /// the value as plain JSON without the tag.
    pub fn from_kind_and_value(kind: RecordKind, value: serde_json::Value) -> Result<Self> {
        let mut obj = match value {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(VaultError::MalformedRecord(format!(
                    "expected a JSON object for kind '{kind}', found {other}"
                )))
            }
        };
        obj.insert("kind".into(), serde_json::Value::String(kind.as_str().into()));
        serde_json::from_value(serde_json::Value::Object(obj))
            .map_err(|e| VaultError::MalformedRecord(format!("value for kind '{kind}': {e}")))
    }
}

/// The persisted form of a record: id + kind + encrypted payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultRecord {
    pub id: String,
    pub kind: RecordKind,
    /// Epoch milliseconds.
    pub created_at: i64,
    pub payload: EncryptedPayload,
}

/// Lightweight record metadata (no ciphertext), for listings.
#[derive(Debug, Clone)]
pub struct RecordMetadata {
    pub id: String,
    pub kind: RecordKind,
    pub created_at: i64,
}

/// Generate a fresh record id: `<kind>_<20 hex chars>`.
pub fn new_record_id(kind: RecordKind) -> String {
    let mut bytes = [0u8; 10];
    OsRng.fill_bytes(&mut bytes);
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!("{kind}_{hex}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_string_roundtrip() {
        for kind in [
            RecordKind::Chat,
            RecordKind::Voice,
            RecordKind::Journal,
            RecordKind::Checkin,
            RecordKind::Contact,
        ] {
            assert_eq!(kind.as_str().parse::<RecordKind>().unwrap(), kind);
        }
        assert!("diary".parse::<RecordKind>().is_err());
    }

    #[test]
    fn record_ids_are_prefixed_and_unique() {
        let a = new_record_id(RecordKind::Journal);
        let b = new_record_id(RecordKind::Journal);
        assert!(a.starts_with("journal_"));
        assert_eq!(a.len(), "journal_".len() + 20);
        assert_ne!(a, b);
    }

    #[test]
    fn value_serializes_with_kind_tag() {
        let value = RecordValue::Journal(JournalEntry {
            title: None,
            body: "long day".into(),
        });
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["kind"], "journal");
        assert_eq!(json["body"], "long day");
    }

    #[test]
    fn from_kind_and_value_builds_tagged_union() {
        let value =
            RecordValue::from_kind_and_value(RecordKind::Checkin, json!({"mood": 4})).unwrap();
        assert_eq!(
            value,
            RecordValue::Checkin(CheckIn {
                mood: 4,
                note: None
            })
        );
    }

    #[test]
    fn from_kind_and_value_rejects_wrong_shape() {
        let err = RecordValue::from_kind_and_value(RecordKind::Contact, json!({"mood": 4}))
            .unwrap_err();
        assert!(matches!(err, VaultError::MalformedRecord(_)));

        let err =
            RecordValue::from_kind_and_value(RecordKind::Journal, json!("not an object"))
                .unwrap_err();
        assert!(matches!(err, VaultError::MalformedRecord(_)));
    }
}
