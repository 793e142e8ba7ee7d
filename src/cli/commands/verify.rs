//! `havenvault verify` — walk the ledger hash chain.
//!
//! Violations are reported, never repaired; the vault stays readable
//! and what to do about it is the user's call.

use crate::cli::{db_path, load_settings, output, Cli};
use crate::errors::{Result, VaultError};
use crate::session::VaultSession;

/// Execute the `verify` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;
    let path = db_path(&settings)?;
    if !path.exists() {
        return Err(VaultError::ConfigError(
            "no vault found — run `havenvault init` first".into(),
        ));
    }

    let session = VaultSession::open(&path)?;
    let entries = session.ledger()?;
    session.verify_integrity()?;

    output::success(&format!(
        "Ledger intact — {} entr{} verified",
        entries.len(),
        if entries.len() == 1 { "y" } else { "ies" }
    ));
    Ok(())
}
