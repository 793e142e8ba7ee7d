//! `havenvault import` — restore a backup.
//!
//! The backup decrypts only under the key it was exported with: the
//! current session key for a same-vault restore, or a device secret
//! supplied explicitly with `--device-secret`.  A passcode-mode backup
//! restored onto a fresh vault unlocks afterwards with its original
//! passcode (salt and iterations travel inside the bundle's meta).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::cli::{open_unlocked, output, Cli};
use crate::crypto::keys::SessionKey;
use crate::errors::{Result, VaultError};

/// Execute the `import` command.
pub fn execute(cli: &Cli, file: &str, device_secret_b64: Option<&str>) -> Result<()> {
    let bytes = std::fs::read(file)?;
    let mut session = open_unlocked(cli)?;

    let (records, ledger) = match device_secret_b64 {
        Some(b64) => {
            let secret = BASE64
                .decode(b64)
                .map_err(|e| VaultError::CommandFailed(format!("--device-secret: {e}")))?;
            let key = SessionKey::from_device_secret(&secret)?;
            session.import_backup_with_key(&bytes, &key)?
        }
        None => session.import_backup(&bytes)?,
    };

    output::success(&format!(
        "Backup restored — {records} record{} and {ledger} ledger entr{}",
        if records == 1 { "" } else { "s" },
        if ledger == 1 { "y" } else { "ies" }
    ));
    Ok(())
}
