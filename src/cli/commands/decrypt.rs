//! `ppap --decrypt`: restore the files inside an artifact.

use std::path::Path;

use crate::cli::output;
use crate::cli::{key_passphrase, Cli, Mode};
use crate::config::Settings;
use crate::crypto::DecryptionKey;
use crate::errors::Result;
use crate::pipeline::Pipeline;

/// Execute a decrypt run.
pub fn execute(cli: &Cli, settings: &Settings, project_dir: &Path) -> Result<()> {
    // 1. Load the private key, unlocking it if needed.
    let key_path = cli.key_path(settings, project_dir, Mode::Decrypt)?;
    let passphrase = key_passphrase(cli, &key_path)?;
    let key = DecryptionKey::load(&key_path, passphrase.as_deref().map(String::as_str))?;
    drop(passphrase);

    // 2. Run the pipeline on the single artifact.
    output::info(&format!("Opening {}", cli.paths[0].display()));
    let pipeline = Pipeline::new(settings.pipeline_options(project_dir));
    let outcome = pipeline.decrypt(&cli.paths[0], &key, cli.out.as_deref())?;

    output::success(&format!(
        "Restored files to {}",
        outcome.restored_to.display()
    ));

    Ok(())
}
