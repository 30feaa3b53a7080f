//! Password-protected compression of the container.
//!
//! The container is stored as the single member of a zip archive,
//! deflated at a fixed level and encrypted with the symmetric passphrase.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use zip::unstable::write::FileOptionsExt;
use zip::write::SimpleFileOptions;
use zip::{AesMode, CompressionMethod, ZipArchive, ZipWriter};

use super::stage::CONTAINER_NAME;
use crate::crypto::SymmetricPassphrase;
use crate::errors::{PpapError, Result};

/// File name of the encrypted archive, inside the staging directory and
/// inside the final artifact.
pub const ENCRYPTED_ARCHIVE_NAME: &str = "ppap_encrypted_contents.zip";

/// Highest deflate level. Level 0 stores the member uncompressed.
pub const MAX_COMPRESSION_LEVEL: u8 = 9;

/// How the archive member is password-protected.
///
/// Readers built on minizip's classic API (pyminizip among them) only
/// understand `ZipCrypto` and cannot open `Aes256` archives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveCipher {
    /// WinZip AES-256 with an HMAC over the compressed data.
    #[default]
    Aes256,
    /// Traditional PKWARE encryption, for readers that know nothing else.
    ZipCrypto,
}

/// Knobs for `seal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SealOptions {
    pub compression_level: u8,
    pub cipher: ArchiveCipher,
}

impl Default for SealOptions {
    fn default() -> Self {
        Self {
            compression_level: 4,
            cipher: ArchiveCipher::default(),
        }
    }
}

/// Compress and encrypt `container` into a zip at `out`.
pub fn seal(
    container: &Path,
    passphrase: &SymmetricPassphrase,
    out: &Path,
    options: &SealOptions,
) -> Result<()> {
    if options.compression_level > MAX_COMPRESSION_LEVEL {
        return Err(PpapError::SealFailed(format!(
            "compression level {} is out of range 0-{MAX_COMPRESSION_LEVEL}",
            options.compression_level
        )));
    }

    let size = fs::metadata(container)
        .map_err(|e| PpapError::SealFailed(format!("cannot read container: {e}")))?
        .len();
    if size == 0 {
        return Err(PpapError::SealFailed("container is empty".into()));
    }

    let member = container
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(CONTAINER_NAME)
        .to_string();

    let mut input = fs::File::open(container)
        .map_err(|e| PpapError::SealFailed(format!("cannot open container: {e}")))?;
    let file = fs::File::create(out)
        .map_err(|e| PpapError::SealFailed(format!("cannot create {}: {e}", out.display())))?;

    let mut zip = ZipWriter::new(file);
    // zip rejects deflate level 0; store the member instead.
    let base = match options.compression_level {
        0 => SimpleFileOptions::default().compression_method(CompressionMethod::Stored),
        level => SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(level.into())),
    }
    .large_file(size > u64::from(u32::MAX));

    let started = match options.cipher {
        ArchiveCipher::Aes256 => zip.start_file(
            member,
            base.with_aes_encryption(AesMode::Aes256, passphrase.as_str()),
        ),
        ArchiveCipher::ZipCrypto => {
            zip.start_file(member, base.with_deprecated_encryption(passphrase.as_bytes()))
        }
    };
    started.map_err(|e| PpapError::SealFailed(e.to_string()))?;

    io::copy(&mut input, &mut zip).map_err(|e| PpapError::SealFailed(e.to_string()))?;
    zip.finish()
        .map_err(|e| PpapError::SealFailed(e.to_string()))?
        .sync_all()
        .map_err(|e| PpapError::SealFailed(e.to_string()))?;

    Ok(())
}

/// Decrypt the archive at `encrypted` and write the container into `dest_dir`.
///
/// Only the container member is read, and it is always written to
/// `dest_dir/ppap_contents.tar` regardless of the name stored in the
/// archive. Returns the path of the extracted container.
pub fn open(
    encrypted: &Path,
    passphrase: &SymmetricPassphrase,
    dest_dir: &Path,
) -> Result<PathBuf> {
    let file = fs::File::open(encrypted)
        .map_err(|e| PpapError::UnsealFailed(format!("cannot open archive: {e}")))?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| PpapError::UnsealFailed(format!("not a valid archive: {e}")))?;

    let member = if archive.index_for_name(CONTAINER_NAME).is_some() {
        CONTAINER_NAME.to_string()
    } else if archive.len() == 1 {
        archive
            .name_for_index(0)
            .map(str::to_string)
            .ok_or_else(|| PpapError::UnsealFailed("archive is empty".into()))?
    } else {
        return Err(PpapError::UnsealFailed(format!(
            "archive does not contain {CONTAINER_NAME}"
        )));
    };

    let mut entry = archive
        .by_name_decrypt(&member, passphrase.as_bytes())
        .map_err(|_| PpapError::UnsealFailed("wrong passphrase or corrupted archive".into()))?;
    if !entry.encrypted() {
        return Err(PpapError::UnsealFailed(
            "archive member is not password-protected".into(),
        ));
    }

    let out = dest_dir.join(CONTAINER_NAME);
    let copied = fs::File::create(&out).and_then(|mut f| io::copy(&mut entry, &mut f));

    if let Err(e) = copied {
        let _ = fs::remove_file(&out);
        return Err(PpapError::UnsealFailed(format!(
            "wrong passphrase or corrupted archive ({e})"
        )));
    }

    Ok(out)
}
