//! `ppap --encrypt`: bundle paths into an artifact for a key owner.

use std::path::Path;

use crate::cli::output;
use crate::cli::{Cli, Mode};
use crate::config::Settings;
use crate::crypto::EncryptionKey;
use crate::errors::Result;
use crate::pipeline::Pipeline;

/// Execute an encrypt run.
pub fn execute(cli: &Cli, settings: &Settings, project_dir: &Path) -> Result<()> {
    // 1. Load the recipient's public key.
    let key_path = cli.key_path(settings, project_dir, Mode::Encrypt)?;
    let key = EncryptionKey::load(&key_path)?;

    // 2. Run the pipeline.
    let pipeline = Pipeline::new(settings.pipeline_options(project_dir));
    let outcome = pipeline.encrypt(&cli.paths, &key, cli.out.as_deref())?;

    // 3. Report what went in and what was skipped.
    for path in &outcome.missing {
        output::warning(&format!("{}: file or directory not found", path.display()));
    }
    output::print_staged_table(&outcome.staged);
    output::success(&format!(
        "Encrypted {} item(s) into {}",
        outcome.staged.len(),
        outcome.artifact.display()
    ));
    output::tip("Only the holder of the matching private key can open this artifact.");

    Ok(())
}
