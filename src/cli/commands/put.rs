//! `havenvault put` — encrypt and store a record.

use crate::cli::{open_unlocked, output, Cli};
use crate::errors::{Result, VaultError};
use crate::vault::record::{RecordKind, RecordValue};

/// Execute the `put` command.
pub fn execute(cli: &Cli, kind: &str, value: &str) -> Result<()> {
    let kind: RecordKind = kind.parse()?;
    let json: serde_json::Value = serde_json::from_str(value)
        .map_err(|e| VaultError::CommandFailed(format!("value is not valid JSON: {e}")))?;
    let value = RecordValue::from_kind_and_value(kind, json)?;

    let mut session = open_unlocked(cli)?;
    let record = session.put(&value)?;

    output::success(&format!("Stored {} record '{}'", record.kind, record.id));
    Ok(())
}
