//! The encrypt and decrypt pipelines.
//!
//! Encrypt: `STAGE → SEAL → WRAP_KEY → PACKAGE → CLEANUP`.
//! Decrypt: `UNPACK → UNWRAP_KEY → UNSEAL → RESTORE → CLEANUP`.
//!
//! Each run owns one staging directory. It is created before the first
//! stage and removed at cleanup whether the run succeeded or not. A failed
//! stage skips straight to cleanup; nothing is retried.

mod decrypt;
mod encrypt;
pub mod staging;

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::archive::{SealOptions, StagedEntry};
use crate::crypto::{DecryptionKey, EncryptionKey, OaepDigest};
use crate::errors::Result;

pub use staging::StagingDir;

/// One step of a pipeline run, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Stage,
    Seal,
    WrapKey,
    Package,
    Unpack,
    UnwrapKey,
    Unseal,
    Restore,
    Cleanup,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stage => "STAGE",
            Self::Seal => "SEAL",
            Self::WrapKey => "WRAP_KEY",
            Self::Package => "PACKAGE",
            Self::Unpack => "UNPACK",
            Self::UnwrapKey => "UNWRAP_KEY",
            Self::Unseal => "UNSEAL",
            Self::Restore => "RESTORE",
            Self::Cleanup => "CLEANUP",
        };
        f.write_str(name)
    }
}

/// Everything a pipeline run needs besides its inputs and key.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Directory that holds staging directories and default outputs.
    pub work_root: PathBuf,
    pub seal: SealOptions,
    pub oaep_digest: OaepDigest,
}

impl PipelineOptions {
    /// Defaults rooted at `work_root`.
    pub fn new(work_root: impl Into<PathBuf>) -> Self {
        Self {
            work_root: work_root.into(),
            seal: SealOptions::default(),
            oaep_digest: OaepDigest::default(),
        }
    }
}

/// What an encrypt run produced.
#[derive(Debug)]
pub struct EncryptOutcome {
    /// Path of the final artifact.
    pub artifact: PathBuf,
    pub staged: Vec<StagedEntry>,
    /// Inputs that did not exist and were left out.
    pub missing: Vec<PathBuf>,
}

/// What a decrypt run produced.
#[derive(Debug)]
pub struct DecryptOutcome {
    /// Directory the files were restored into.
    pub restored_to: PathBuf,
}

/// Runs encrypt and decrypt operations with a fixed set of options.
#[derive(Debug, Clone)]
pub struct Pipeline {
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Bundle `inputs` into a final artifact that only `key`'s owner can open.
    ///
    /// `output` follows `staging::artifact_path`. Inputs that do not exist
    /// are skipped and listed in the outcome; if none exist the run fails.
    pub fn encrypt(
        &self,
        inputs: &[PathBuf],
        key: &EncryptionKey,
        output: Option<&Path>,
    ) -> Result<EncryptOutcome> {
        let staging = StagingDir::create(&self.options.work_root)?;
        let result = encrypt::run(&self.options, staging.path(), inputs, key, output);
        finish(staging, result)
    }

    /// Restore the files in `artifact` using `key`.
    ///
    /// With no `output`, or an `output` that is an existing directory, files
    /// go into a fresh `ppap-<timestamp>` directory inside it (or inside the
    /// work root). Any other `output` is used as the restore directory.
    pub fn decrypt(
        &self,
        artifact: &Path,
        key: &DecryptionKey,
        output: Option<&Path>,
    ) -> Result<DecryptOutcome> {
        let staging = StagingDir::create(&self.options.work_root)?;
        let result = decrypt::run(&self.options, staging.path(), artifact, key, output);
        finish(staging, result)
    }
}

/// The CLEANUP stage: always remove the staging directory, then report.
///
/// A stage error wins over a cleanup error; the latter is only logged.
fn finish<T>(staging: StagingDir, result: Result<T>) -> Result<T> {
    debug!(stage = %Stage::Cleanup, "entering stage");
    let cleanup = staging.close();
    match (result, cleanup) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(cleanup_err)) => {
            warn!(error = %cleanup_err, "cleanup failed after an earlier error");
            Err(e)
        }
    }
}

/// Run one stage, logging entry and failure.
fn run_stage<T>(stage: Stage, f: impl FnOnce() -> Result<T>) -> Result<T> {
    debug!(%stage, "entering stage");
    f().inspect_err(|e| warn!(%stage, error = %e, "stage failed"))
}
