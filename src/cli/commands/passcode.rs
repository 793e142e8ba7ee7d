//! `havenvault set-passcode` — switch the vault to passcode mode.
//!
//! Requires an unlocked session (device mode unlocks automatically; an
//! existing passcode is prompted for).  Every stored record is
//! re-encrypted under the new key in one transaction.

use crate::cli::{load_settings, open_unlocked, output, prompt_new_passcode, Cli};
use crate::errors::Result;

/// Execute the `set-passcode` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;
    let mut session = open_unlocked(cli)?;

    output::info("Choose the new vault passcode.");
    let passcode = prompt_new_passcode()?;

    let count = session.set_passcode_with_iterations(&passcode, settings.pbkdf2_iterations)?;

    output::success(&format!(
        "Vault switched to passcode mode ({count} record{} re-encrypted)",
        if count == 1 { "" } else { "s" }
    ));
    output::tip("The device secret has been discarded — the passcode is now the only key.");
    Ok(())
}
