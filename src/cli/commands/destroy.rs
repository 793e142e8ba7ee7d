//! `havenvault destroy` — irreversibly wipe the vault.
//!
//! Not a soft delete: meta, records, and ledger are destroyed, then a
//! brand-new empty device-mode vault is initialized in their place.

use crate::cli::{db_path, load_settings, output, Cli};
use crate::errors::{Result, VaultError};
use crate::session::VaultSession;

/// Execute the `destroy` command.
pub fn execute(cli: &Cli, force: bool) -> Result<()> {
    let settings = load_settings(cli)?;
    let path = db_path(&settings)?;
    if !path.exists() {
        return Err(VaultError::ConfigError(
            "no vault found — nothing to destroy".into(),
        ));
    }

    if !force {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt("This permanently destroys every record, the ledger, and all keys. Continue?")
            .default(false)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("confirmation prompt: {e}")))?;
        if !confirmed {
            return Err(VaultError::UserCancelled);
        }
    }

    let mut session = VaultSession::open(&path)?;
    session.delete_everything()?;

    output::success("Vault destroyed — a fresh empty vault has been created in its place.");
    Ok(())
}
