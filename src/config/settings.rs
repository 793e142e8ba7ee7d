use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaultError};

/// Project-level configuration, loaded from `.havenvault.toml`.
///
/// Every field has a sensible default so HavenVault works
/// out-of-the-box without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory (relative to the project root) holding the vault
    /// database.
    #[serde(default = "default_vault_dir")]
    pub vault_dir: String,

    /// PBKDF2 iteration count used when setting a passcode.  The
    /// crypto layer enforces a hard floor of 100,000 regardless.
    #[serde(default = "default_pbkdf2_iterations")]
    pub pbkdf2_iterations: u32,

    /// Seconds of inactivity before an embedding application should
    /// lock the session (consumed via `VaultSession::lock_if_idle`).
    #[serde(default = "default_auto_lock_secs")]
    pub auto_lock_secs: u64,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault_dir() -> String {
    ".havenvault".to_string()
}

fn default_pbkdf2_iterations() -> u32 {
    210_000
}

fn default_auto_lock_secs() -> u64 {
    300
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_dir: default_vault_dir(),
            pbkdf2_iterations: default_pbkdf2_iterations(),
            auto_lock_secs: default_auto_lock_secs(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    const FILE_NAME: &'static str = ".havenvault.toml";

    /// Load settings from `<project_dir>/.havenvault.toml`.
    ///
    /// If the file does not exist, defaults are returned.  If the file
    /// exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Full path to the vault database file.
    ///
    /// Example: `project_dir/.havenvault/haven.db`
    pub fn db_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.vault_dir).join("haven.db")
    }

    /// The idle-lock timeout as a `Duration`.
    pub fn auto_lock(&self) -> Duration {
        Duration::from_secs(self.auto_lock_secs)
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.vault_dir, ".havenvault");
        assert_eq!(s.pbkdf2_iterations, 210_000);
        assert_eq!(s.auto_lock_secs, 300);
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.vault_dir, ".havenvault");
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
vault_dir = "private"
pbkdf2_iterations = 400000
auto_lock_secs = 120
"#;
        fs::write(tmp.path().join(".havenvault.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.vault_dir, "private");
        assert_eq!(settings.pbkdf2_iterations, 400_000);
        assert_eq!(settings.auto_lock(), Duration::from_secs(120));
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".havenvault.toml"), "vault_dir = \"v\"\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.vault_dir, "v");
        assert_eq!(settings.pbkdf2_iterations, 210_000);
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".havenvault.toml"), "not valid {{toml").unwrap();

        assert!(Settings::load(tmp.path()).is_err());
    }

    #[test]
    fn db_path_builds_correct_path() {
        let s = Settings::default();
        let path = s.db_path(Path::new("/home/user/project"));
        assert_eq!(path, PathBuf::from("/home/user/project/.havenvault/haven.db"));
    }
}
