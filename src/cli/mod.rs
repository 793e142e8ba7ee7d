//! CLI module — Clap argument parser, output helpers, and command
//! implementations.  The CLI is the "surrounding application": it only
//! calls the vault session's public operations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{Result, VaultError};
use crate::session::VaultSession;
use crate::vault::meta::VaultMode;

/// Minimum passcode length to prevent trivially weak passcodes.
const MIN_PASSCODE_LEN: usize = 6;

/// HavenVault CLI: encrypted personal record vault.
#[derive(Parser)]
#[command(
    name = "havenvault",
    about = "Encrypted personal record vault with a tamper-evident ledger",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault directory (default: .havenvault, or vault_dir from .havenvault.toml)
    #[arg(long, global = true)]
    pub vault_dir: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Initialize a new vault (device mode, auto-unlocking)
    Init,

    /// Store a record
    Put {
        /// Record kind: chat, voice, journal, checkin, or contact
        kind: String,
        /// The record value as JSON (e.g. '{"body":"long day"}')
        value: String,
    },

    /// Decrypt and print a record
    Get {
        /// Record id (as printed by `put` or `list`)
        id: String,
    },

    /// List all records (metadata only, nothing is decrypted)
    List,

    /// Manage the single trusted contact
    Contact {
        #[command(subcommand)]
        action: ContactAction,
    },

    /// View the tamper-evident ledger
    Log {
        /// Number of entries to show (default: 50)
        #[arg(long, default_value = "50")]
        last: usize,
    },

    /// Verify the ledger hash chain
    Verify,

    /// Switch the vault to passcode mode (re-encrypts every record)
    SetPasscode,

    /// Export an encrypted backup of the whole vault
    Export {
        /// Output file path (default: haven-backup-<date>.json)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Restore a backup, replacing the vault contents
    Import {
        /// Path to the backup file
        file: String,

        /// Base64 device secret of the vault the backup came from
        /// (needed when restoring a device-mode backup onto a fresh vault)
        #[arg(long)]
        device_secret: Option<String>,
    },

    /// Irreversibly destroy the vault and start over
    Destroy {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },
}

/// Contact subcommands.
#[derive(clap::Subcommand)]
pub enum ContactAction {
    /// Set (or replace) the trusted contact
    Set {
        /// Contact name
        name: String,
        /// How to reach them (phone, handle, ...)
        handle: String,
    },

    /// Show the trusted contact
    Show,
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolve settings, honoring the `--vault-dir` override.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let cwd = std::env::current_dir()?;
    let mut settings = Settings::load(&cwd)?;
    if let Some(ref dir) = cli.vault_dir {
        settings.vault_dir = dir.clone();
    }
    Ok(settings)
}

/// Full path to the vault database for this invocation.
pub fn db_path(settings: &Settings) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(settings.db_path(&cwd))
}

/// Open the vault and bring the session to its initialized state.
///
/// Fails with a pointer to `init` if no vault exists yet; prompts for
/// the passcode when the vault is in passcode mode.
pub fn open_unlocked(cli: &Cli) -> Result<VaultSession> {
    let settings = load_settings(cli)?;
    let path = db_path(&settings)?;
    if !path.exists() {
        return Err(VaultError::ConfigError(
            "no vault found — run `havenvault init` first".into(),
        ));
    }

    let mut session = VaultSession::open(&path)?;
    session.init()?;

    if session.mode() == VaultMode::Passcode && !session.is_unlocked() {
        let passcode = prompt_passcode()?;
        session.unlock_with_passcode(&passcode)?;
    }

    Ok(session)
}

/// Get the vault passcode, trying in order:
/// 1. `HAVENVAULT_PASSCODE` env var (CI/scripts)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the passcode is wiped from memory on drop.
pub fn prompt_passcode() -> Result<Zeroizing<String>> {
    if let Ok(pc) = std::env::var("HAVENVAULT_PASSCODE") {
        if !pc.is_empty() {
            return Ok(Zeroizing::new(pc));
        }
    }

    let pc = dialoguer::Password::new()
        .with_prompt("Enter vault passcode")
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("passcode prompt: {e}")))?;
    Ok(Zeroizing::new(pc))
}

/// Prompt for a new passcode with confirmation (used by `set-passcode`).
///
/// Also respects `HAVENVAULT_PASSCODE` for scripted usage.  Enforces a
/// minimum length.
pub fn prompt_new_passcode() -> Result<Zeroizing<String>> {
    if let Ok(pc) = std::env::var("HAVENVAULT_PASSCODE") {
        if !pc.is_empty() {
            if pc.len() < MIN_PASSCODE_LEN {
                return Err(VaultError::CommandFailed(format!(
                    "passcode must be at least {MIN_PASSCODE_LEN} characters"
                )));
            }
            return Ok(Zeroizing::new(pc));
        }
    }

    loop {
        let passcode = dialoguer::Password::new()
            .with_prompt("Choose vault passcode")
            .with_confirmation("Confirm vault passcode", "Passcodes do not match, try again")
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("passcode prompt: {e}")))?;

        if passcode.len() < MIN_PASSCODE_LEN {
            output::warning(&format!(
                "Passcode must be at least {MIN_PASSCODE_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(passcode));
    }
}
