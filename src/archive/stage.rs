//! Staging inputs into the uncompressed container.
//!
//! Each input is copied into a subdirectory of the work directory, then
//! everything is bundled into `ppap_contents.tar` next to it and the
//! loose copies are removed.
//!
//! Placement of a standalone file keeps one level of context: it lands
//! under a directory named after its lexical parent, so `docs/a.txt`
//! becomes `docs/a.txt` inside the container. A file whose path has no
//! named parent (`a.txt`, `../a.txt`) goes to the top level. Directories
//! keep their own name as the top-level entry.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::errors::{PpapError, Result};

/// File name of the container inside the work directory.
pub const CONTAINER_NAME: &str = "ppap_contents.tar";

/// Subdirectory of the work directory that holds the loose copies.
const LOOSE_DIR_NAME: &str = "inputs";

/// What kind of input an entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => f.write_str("file"),
            Self::Directory => f.write_str("directory"),
        }
    }
}

/// One input as it was placed in the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedEntry {
    /// The input path as given.
    pub source: PathBuf,
    /// Relative path of the entry inside the container.
    pub archived_as: PathBuf,
    pub kind: EntryKind,
}

/// Result of staging a list of inputs.
#[derive(Debug)]
pub struct StageReport {
    /// Path of the finished container.
    pub container: PathBuf,
    /// Inputs that were staged, in the order given.
    pub staged: Vec<StagedEntry>,
    /// Inputs that did not exist and were skipped.
    pub missing: Vec<PathBuf>,
}

/// Copy `inputs` into `work_dir` and bundle them into the container.
///
/// Missing inputs are skipped and reported. Inputs are processed in
/// order and not deduplicated; a later input whose placement collides
/// with an earlier one merges into it, overwriting files of the same name.
///
/// Copies go into their own subdirectory so no input can clash with the
/// container or anything else the pipeline keeps in `work_dir`.
pub fn stage(inputs: &[PathBuf], work_dir: &Path) -> Result<StageReport> {
    let mut staged = Vec::new();
    let mut missing = Vec::new();
    // Inputs may contain the work directory itself (`ppap -e .`).
    let work_real = work_dir.canonicalize()?;
    let loose_root = work_dir.join(LOOSE_DIR_NAME);
    fs::create_dir(&loose_root)?;

    for input in inputs {
        if !input.exists() {
            warn!(path = %input.display(), "input not found, skipping");
            missing.push(input.clone());
            continue;
        }

        let entry = place(input)?;
        let dest = loose_root.join(&entry.archived_as);
        match entry.kind {
            EntryKind::Directory => copy_dir_recursive(input, &dest, &work_real)?,
            EntryKind::File => {
                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(input, &dest)?;
            }
        }
        debug!(
            source = %input.display(),
            archived_as = %entry.archived_as.display(),
            "staged input"
        );
        staged.push(entry);
    }

    let container = work_dir.join(CONTAINER_NAME);
    if !staged.is_empty() {
        build_container(&loose_root, &container)?;
    }
    fs::remove_dir_all(&loose_root)?;

    Ok(StageReport {
        container,
        staged,
        missing,
    })
}

/// Extract `container` under `dest`.
///
/// If `dest` is an existing directory, a fresh subdirectory named
/// `subdir_name` is created inside it; otherwise `dest` itself becomes
/// the extraction root. Returns the extraction root.
pub fn unstage(container: &Path, dest: &Path, subdir_name: &str) -> Result<PathBuf> {
    let root = if dest.is_dir() {
        dest.join(subdir_name)
    } else {
        dest.to_path_buf()
    };

    let created = !root.exists();
    fs::create_dir_all(&root)?;

    let result = fs::File::open(container)
        .map(tar::Archive::new)
        .and_then(|mut archive| archive.unpack(&root));

    if let Err(e) = result {
        if created {
            let _ = fs::remove_dir_all(&root);
        }
        return Err(e.into());
    }

    Ok(root)
}

/// Decide where an existing input lands inside the container.
fn place(input: &Path) -> Result<StagedEntry> {
    if input.is_dir() {
        let name = match input.file_name() {
            Some(name) => name.to_os_string(),
            // `.`, `..` and friends: use the real directory's name.
            None => input
                .canonicalize()?
                .file_name()
                .map(|n| n.to_os_string())
                .ok_or_else(|| {
                    PpapError::Usage(format!(
                        "cannot archive '{}': the directory has no name",
                        input.display()
                    ))
                })?,
        };
        return Ok(StagedEntry {
            source: input.to_path_buf(),
            archived_as: PathBuf::from(name),
            kind: EntryKind::Directory,
        });
    }

    let file_name = input.file_name().ok_or_else(|| {
        PpapError::Usage(format!("cannot archive '{}': not a file name", input.display()))
    })?;
    let archived_as = match input.parent().and_then(Path::file_name) {
        Some(parent) => Path::new(parent).join(file_name),
        None => PathBuf::from(file_name),
    };

    Ok(StagedEntry {
        source: input.to_path_buf(),
        archived_as,
        kind: EntryKind::File,
    })
}

/// Recursively copy `src` into `dst`, following symlinks and skipping
/// the directory `skip`.
fn copy_dir_recursive(src: &Path, dst: &Path, skip: &Path) -> Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        if from.is_dir() {
            if from.canonicalize()? == skip {
                continue;
            }
            copy_dir_recursive(&from, &to, skip)?;
        } else {
            fs::copy(&from, &to)?;
        }
    }
    Ok(())
}

/// Top-level entries of `loose_root`, sorted.
fn loose_entries(loose_root: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(loose_root)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();
    Ok(entries)
}

fn build_container(loose_root: &Path, container: &Path) -> Result<()> {
    let file = fs::File::create(container)?;
    let mut builder = tar::Builder::new(file);

    for path in loose_entries(loose_root)? {
        let name = path
            .strip_prefix(loose_root)
            .map_err(|e| PpapError::Io(std::io::Error::other(e)))?;
        if path.is_dir() {
            builder.append_dir_all(name, &path)?;
        } else {
            builder.append_path_with_name(&path, name)?;
        }
    }

    builder.into_inner()?.sync_all()?;
    Ok(())
}
