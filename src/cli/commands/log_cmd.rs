//! `havenvault log` — view the tamper-evident ledger.
//!
//! The ledger holds only ids, kinds, timestamps, and hashes, so this
//! works without unlocking.

use crate::cli::{db_path, load_settings, output, Cli};
use crate::errors::{Result, VaultError};
use crate::session::VaultSession;

/// Execute the `log` command.
pub fn execute(cli: &Cli, last: usize) -> Result<()> {
    let settings = load_settings(cli)?;
    let path = db_path(&settings)?;
    if !path.exists() {
        return Err(VaultError::ConfigError(
            "no vault found — run `havenvault init` first".into(),
        ));
    }

    let session = VaultSession::open(&path)?;
    let entries = session.ledger()?;

    // Most recent entries, still displayed in chain order.
    let start = entries.len().saturating_sub(last);
    output::print_ledger_table(&entries[start..]);
    Ok(())
}
