//! `havenvault get` — decrypt and print a record.

use crate::cli::{open_unlocked, output, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `get` command.
pub fn execute(cli: &Cli, id: &str) -> Result<()> {
    let mut session = open_unlocked(cli)?;

    match session.get(id)? {
        Some(value) => {
            let json = serde_json::to_string_pretty(&value)
                .map_err(|e| VaultError::SerializationError(format!("record value: {e}")))?;
            println!("{json}");
            Ok(())
        }
        None => {
            output::warning(&format!("No record with id '{id}'"));
            Ok(())
        }
    }
}
