//! The per-operation staging directory and output naming.
//!
//! Names carry a timestamp with microsecond resolution. Staging
//! directories also get a random suffix so two runs started in the same
//! tick do not collide; output names do not, and such runs can still
//! race on the default output path.

use std::path::{Path, PathBuf};

use chrono::Local;
use tempfile::TempDir;
use tracing::debug;

use crate::errors::{PpapError, Result};

/// Prefix of every staging directory.
pub const STAGING_PREFIX: &str = "temp-ppap-";

/// Prefix of default artifact and restore names.
pub const OUTPUT_PREFIX: &str = "ppap-";

/// Local time as `YYYYmmdd_HHMMSSffffff`.
pub fn timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S%6f").to_string()
}

/// A uniquely named working directory that is removed when the guard goes
/// away.
///
/// Dropping the guard removes the directory silently (this also covers
/// unwinding). Call `close` to remove it and learn whether that worked.
/// Nothing is removed if the process is killed.
#[derive(Debug)]
pub struct StagingDir {
    dir: TempDir,
}

impl StagingDir {
    /// Create `temp-ppap-<timestamp>-<random>` under `root`.
    pub fn create(root: &Path) -> Result<Self> {
        let prefix = format!("{STAGING_PREFIX}{}-", timestamp());
        let dir = tempfile::Builder::new()
            .prefix(&prefix)
            .rand_bytes(6)
            .tempdir_in(root)?;
        debug!(path = %dir.path().display(), "created staging directory");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the directory and everything in it.
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .map_err(|source| PpapError::Cleanup {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), "removed staging directory");
        Ok(())
    }
}

/// Where an encrypt run writes its artifact.
///
/// No `out`: `<work_root>/ppap-<ts>.zip`. An existing directory:
/// `<out>/ppap-<ts>.zip`. Anything else is used as the file path.
pub fn artifact_path(work_root: &Path, out: Option<&Path>) -> PathBuf {
    let name = format!("{OUTPUT_PREFIX}{}.zip", timestamp());
    match out {
        None => work_root.join(name),
        Some(out) if out.is_dir() => out.join(name),
        Some(out) => out.to_path_buf(),
    }
}

/// Name of a default restore directory, `ppap-<ts>`.
pub fn restore_dir_name() -> String {
    format!("{OUTPUT_PREFIX}{}", timestamp())
}
