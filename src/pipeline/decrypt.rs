use std::path::Path;

use super::staging::restore_dir_name;
use super::{run_stage, DecryptOutcome, PipelineOptions, Stage};
use crate::archive;
use crate::crypto::{self, DecryptionKey, WrappedPassphrase};
use crate::errors::Result;

pub(super) fn run(
    options: &PipelineOptions,
    work_dir: &Path,
    artifact: &Path,
    key: &DecryptionKey,
    output: Option<&Path>,
) -> Result<DecryptOutcome> {
    let unpacked = run_stage(Stage::Unpack, || archive::unpack(artifact, work_dir))?;

    let passphrase = run_stage(Stage::UnwrapKey, || {
        let wrapped = WrappedPassphrase::from_hex(&unpacked.wrapped_hex)?;
        crypto::unwrap(&wrapped, key, options.oaep_digest)
    })?;

    let container = run_stage(Stage::Unseal, || {
        archive::open(&unpacked.encrypted_archive, &passphrase, work_dir)
    })?;
    drop(passphrase);

    let dest = output.unwrap_or(options.work_root.as_path());
    let restored_to = run_stage(Stage::Restore, || {
        archive::unstage(&container, dest, &restore_dir_name())
    })?;

    Ok(DecryptOutcome { restored_to })
}
