//! `havenvault init` — create a new vault.
//!
//! A fresh vault starts in device mode: a random 32-byte secret stored
//! alongside the data, unlocking automatically.  `set-passcode`
//! upgrades it to passcode mode.

use crate::cli::{db_path, load_settings, output, Cli};
use crate::errors::Result;
use crate::session::VaultSession;

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;
    let path = db_path(&settings)?;

    if path.exists() {
        output::info(&format!("Vault already exists at {}", path.display()));
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut session = VaultSession::open(&path)?;
    session.init()?;

    output::success(&format!(
        "Vault created at {} ({} mode)",
        path.display(),
        session.mode().as_str()
    ));
    output::tip("Run `havenvault set-passcode` to protect it with a passcode.");
    output::tip("Run `havenvault contact set <name> <handle>` to store a trusted contact.");
    Ok(())
}
