use std::fs;
use std::path::{Path, PathBuf};

use super::staging::artifact_path;
use super::{run_stage, EncryptOutcome, PipelineOptions, Stage};
use crate::archive::{self, ENCRYPTED_ARCHIVE_NAME};
use crate::crypto::{self, EncryptionKey, SymmetricPassphrase};
use crate::errors::{PpapError, Result};

pub(super) fn run(
    options: &PipelineOptions,
    work_dir: &Path,
    inputs: &[PathBuf],
    key: &EncryptionKey,
    output: Option<&Path>,
) -> Result<EncryptOutcome> {
    let report = run_stage(Stage::Stage, || {
        let report = archive::stage(inputs, work_dir)?;
        if report.staged.is_empty() {
            return Err(PpapError::NothingToEncrypt);
        }
        Ok(report)
    })?;

    let passphrase = SymmetricPassphrase::generate();
    let encrypted = work_dir.join(ENCRYPTED_ARCHIVE_NAME);

    run_stage(Stage::Seal, || {
        archive::seal(&report.container, &passphrase, &encrypted, &options.seal)?;
        // Don't leave cleartext next to the ciphertext any longer than needed.
        fs::remove_file(&report.container)?;
        Ok(())
    })?;

    let wrapped = run_stage(Stage::WrapKey, || {
        crypto::wrap(&passphrase, key, options.oaep_digest)
    })?;
    drop(passphrase);

    let artifact = artifact_path(&options.work_root, output);
    run_stage(Stage::Package, || {
        archive::package(&encrypted, &wrapped, &artifact)
    })?;

    Ok(EncryptOutcome {
        artifact,
        staged: report.staged,
        missing: report.missing,
    })
}
