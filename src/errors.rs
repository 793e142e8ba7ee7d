use thiserror::Error;

/// All errors that can occur in HavenVault.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Wrong key and tampered ciphertext are intentionally conflated so a
    /// caller can never use the error to tell the two apart.
    #[error("Decryption failed — wrong key or corrupted data")]
    DecryptFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Unsupported payload version {0}")]
    UnsupportedVersion(u8),

    // --- Session errors ---
    #[error("Vault is locked — unlock it first")]
    VaultLocked,

    #[error("Vault is busy — a re-key is in progress")]
    VaultBusy,

    #[error("Vault is not in {0} mode")]
    WrongMode(&'static str),

    #[error("Incorrect passcode")]
    WrongPasscode,

    /// Fatal: the stored meta sentinel cannot be decrypted by any derivable
    /// key. There is no recovery path short of `destroy`.
    #[error("Vault meta is corrupted: {0}")]
    CorruptMeta(String),

    // --- Record errors ---
    #[error("Record decrypted but has an invalid shape: {0}")]
    MalformedRecord(String),

    // --- Ledger errors ---
    #[error("Ledger integrity violation at seq {at_seq}: {reason}")]
    IntegrityViolation { at_seq: u64, reason: String },

    // --- Backup errors ---
    #[error("Invalid backup: {0}")]
    InvalidBackup(String),

    // --- Storage errors ---
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- Config / CLI errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,
}

/// Convenience type alias for HavenVault results.
pub type Result<T> = std::result::Result<T, VaultError>;
