//! `havenvault list` — record metadata table.
//!
//! Metadata only; nothing is decrypted.

use crate::cli::{open_unlocked, output, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let session = open_unlocked(cli)?;
    let records = session.list()?;
    output::print_records_table(&records);
    Ok(())
}
