//! The final artifact: an outer zip with exactly two members.
//!
//! ```text
//! ppap-20240101_120000123456.zip
//! ├── ppap_encrypted_contents.zip   encrypted archive, stored as-is
//! └── .encrypted_key                hex of the wrapped passphrase
//! ```

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::seal::ENCRYPTED_ARCHIVE_NAME;
use crate::crypto::WrappedPassphrase;
use crate::errors::{PpapError, Result};

/// Member holding the hex-encoded wrapped passphrase.
pub const WRAPPED_KEY_NAME: &str = ".encrypted_key";

/// Upper bound on the wrapped-key member; a 16384-bit key needs 4 KiB of hex.
const MAX_WRAPPED_KEY_LEN: u64 = 64 * 1024;

/// The two halves of an unpacked artifact.
#[derive(Debug)]
pub struct Unpacked {
    /// Where the encrypted archive was extracted.
    pub encrypted_archive: PathBuf,
    /// Contents of the wrapped-key member, still hex-encoded.
    pub wrapped_hex: String,
}

/// Combine the encrypted archive and the wrapped passphrase into `dest`.
///
/// The artifact is written to a temporary file next to `dest` and renamed
/// into place, so `dest` either holds a complete artifact or nothing new.
pub fn package(encrypted_archive: &Path, wrapped: &WrappedPassphrase, dest: &Path) -> Result<()> {
    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut temp = tempfile::Builder::new()
        .prefix(".ppap-partial-")
        .tempfile_in(dir)?;

    {
        let mut zip = ZipWriter::new(temp.as_file_mut());
        // The encrypted archive is already compressed; deflating it again
        // only burns time.
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file(ENCRYPTED_ARCHIVE_NAME, stored)
            .map_err(zip_io_error)?;
        let mut archive = fs::File::open(encrypted_archive)?;
        io::copy(&mut archive, &mut zip)?;

        zip.start_file(WRAPPED_KEY_NAME, deflated)
            .map_err(zip_io_error)?;
        zip.write_all(wrapped.to_hex().as_bytes())?;

        zip.finish().map_err(zip_io_error)?;
    }

    temp.as_file().sync_all()?;
    temp.persist(dest).map_err(|e| PpapError::Io(e.error))?;
    Ok(())
}

/// Split the artifact at `artifact`, extracting the encrypted archive into
/// `work_dir`.
///
/// Both members must be present and nothing else may be.
pub fn unpack(artifact: &Path, work_dir: &Path) -> Result<Unpacked> {
    let file = fs::File::open(artifact).map_err(|e| {
        PpapError::InvalidArtifact(format!("cannot open {}: {e}", artifact.display()))
    })?;
    let mut zip = ZipArchive::new(file)
        .map_err(|e| PpapError::InvalidArtifact(format!("not a zip archive: {e}")))?;

    for name in zip.file_names() {
        if name != ENCRYPTED_ARCHIVE_NAME && name != WRAPPED_KEY_NAME {
            return Err(PpapError::InvalidArtifact(format!(
                "unexpected member '{name}'"
            )));
        }
    }

    let wrapped_hex = {
        let entry = zip
            .by_name(WRAPPED_KEY_NAME)
            .map_err(|_| missing_member(WRAPPED_KEY_NAME))?;
        let mut text = String::new();
        entry
            .take(MAX_WRAPPED_KEY_LEN)
            .read_to_string(&mut text)
            .map_err(|e| PpapError::InvalidArtifact(format!("unreadable {WRAPPED_KEY_NAME}: {e}")))?;
        text
    };

    let encrypted_archive = work_dir.join(ENCRYPTED_ARCHIVE_NAME);
    {
        let mut entry = zip
            .by_name(ENCRYPTED_ARCHIVE_NAME)
            .map_err(|_| missing_member(ENCRYPTED_ARCHIVE_NAME))?;
        let mut out = fs::File::create(&encrypted_archive)?;
        io::copy(&mut entry, &mut out).map_err(|e| {
            PpapError::InvalidArtifact(format!("unreadable {ENCRYPTED_ARCHIVE_NAME}: {e}"))
        })?;
    }

    Ok(Unpacked {
        encrypted_archive,
        wrapped_hex,
    })
}

fn missing_member(name: &str) -> PpapError {
    PpapError::InvalidArtifact(format!("missing member '{name}'"))
}

fn zip_io_error(e: zip::result::ZipError) -> PpapError {
    PpapError::Io(io::Error::other(e))
}
