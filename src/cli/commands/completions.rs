//! `havenvault completions` — generate shell completion scripts.

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::errors::{Result, VaultError};

/// Execute the `completions` command.
pub fn execute(shell: &str) -> Result<()> {
    let shell: Shell = shell.parse().map_err(|_| {
        VaultError::CommandFailed(format!(
            "unknown shell '{shell}' — expected bash, zsh, fish, or powershell"
        ))
    })?;

    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "havenvault", &mut std::io::stdout());
    Ok(())
}
