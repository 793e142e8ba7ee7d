//! `havenvault export` — write an encrypted backup file.

use crate::cli::{open_unlocked, output, Cli};
use crate::errors::Result;

/// Execute the `export` command.
pub fn execute(cli: &Cli, output_path: Option<&str>) -> Result<()> {
    let mut session = open_unlocked(cli)?;
    let bytes = session.export_backup()?;

    let path = match output_path {
        Some(p) => p.to_string(),
        None => format!("haven-backup-{}.json", chrono::Utc::now().format("%Y%m%d")),
    };

    std::fs::write(&path, &bytes)?;
    output::success(&format!("Backup written to {path} ({} bytes)", bytes.len()));
    output::tip("The backup is encrypted under the current vault key; it is useless without it.");
    Ok(())
}
