use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in ppap.
///
/// A path that does not exist is deliberately absent: missing inputs are
/// reported back to the caller as data and never abort an operation.
#[derive(Debug, Error)]
pub enum PpapError {
    // --- Usage errors ---
    #[error("{0}")]
    Usage(String),

    // --- Key errors ---
    #[error("Cannot load key from {path}: {reason}")]
    KeyLoad { path: PathBuf, reason: String },

    // --- Envelope errors ---
    #[error(
        "Passphrase is {len} bytes but a {bits}-bit key can wrap at most {max} bytes; use a larger key"
    )]
    PassphraseTooLarge { len: usize, max: usize, bits: usize },

    #[error("Wrapping the passphrase failed: {0}")]
    WrapFailed(String),

    #[error("Unwrapping the passphrase failed: wrong key or corrupted artifact")]
    UnwrapFailed,

    // --- Archive errors ---
    #[error("Sealing the archive failed: {0}")]
    SealFailed(String),

    #[error("Unsealing the archive failed: {0}")]
    UnsealFailed(String),

    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),

    #[error("None of the input paths exist, nothing to encrypt")]
    NothingToEncrypt,

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("Failed to remove staging directory {path}: {source}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for ppap results.
pub type Result<T> = std::result::Result<T, PpapError>;
