use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::archive::seal::{ArchiveCipher, SealOptions, MAX_COMPRESSION_LEVEL};
use crate::crypto::OaepDigest;
use crate::errors::{PpapError, Result};
use crate::pipeline::PipelineOptions;

/// Project-level configuration, loaded from `.ppap.toml`.
///
/// Every field has a sensible default so ppap works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Directory (relative to the project dir) for staging and default outputs.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// Deflate level of the encrypted archive, 0-9 (default: 4).
    #[serde(default = "default_compression_level")]
    pub compression_level: u8,

    /// Password protection of the encrypted archive (default: aes256).
    #[serde(default)]
    pub archive_cipher: ArchiveCipher,

    /// OAEP digest for wrapping the passphrase (default: sha1).
    #[serde(default)]
    pub oaep_digest: OaepDigest,

    /// Key used by `--encrypt` when `--key` is not given.
    #[serde(default)]
    pub encrypt_key: Option<PathBuf>,

    /// Key used by `--decrypt` when `--key` is not given.
    #[serde(default)]
    pub decrypt_key: Option<PathBuf>,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_work_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_compression_level() -> u8 {
    4
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            compression_level: default_compression_level(),
            archive_cipher: ArchiveCipher::default(),
            oaep_digest: OaepDigest::default(),
            encrypt_key: None,
            decrypt_key: None,
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    const FILE_NAME: &'static str = ".ppap.toml";

    /// Load settings from `<project_dir>/.ppap.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed or holds out-of-range
    /// values, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            PpapError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.compression_level > MAX_COMPRESSION_LEVEL {
            return Err(PpapError::ConfigError(format!(
                "compression_level must be between 0 and {MAX_COMPRESSION_LEVEL}, got {}",
                self.compression_level
            )));
        }
        Ok(())
    }

    /// Resolve a configured path against the project dir.
    fn resolve(project_dir: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            project_dir.join(path)
        }
    }

    /// Absolute work root for the given project dir.
    pub fn work_root(&self, project_dir: &Path) -> PathBuf {
        Self::resolve(project_dir, &self.work_dir)
    }

    /// Default key for the given mode, resolved against the project dir.
    pub fn default_key(&self, project_dir: &Path, decrypting: bool) -> Option<PathBuf> {
        let key = if decrypting {
            self.decrypt_key.as_deref()
        } else {
            self.encrypt_key.as_deref()
        };
        key.map(|k| Self::resolve(project_dir, k))
    }

    /// Convert the settings into pipeline options.
    pub fn pipeline_options(&self, project_dir: &Path) -> PipelineOptions {
        PipelineOptions {
            work_root: self.work_root(project_dir),
            seal: SealOptions {
                compression_level: self.compression_level,
                cipher: self.archive_cipher,
            },
            oaep_digest: self.oaep_digest,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
