//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::crypto::is_passphrase_protected;
use crate::errors::{PpapError, Result};

/// ppap: bundle files into an encrypted archive sealed with an RSA key.
#[derive(Parser, Debug)]
#[command(
    name = "ppap",
    about = "Bundle files into an encrypted archive whose password is sealed with an RSA public key",
    version
)]
pub struct Cli {
    /// Files or directories to encrypt, or the single artifact to decrypt
    #[arg(required = true, value_name = "PATHS")]
    pub paths: Vec<PathBuf>,

    /// Bundle and encrypt the given paths
    #[arg(short, long)]
    pub encrypt: bool,

    /// Decrypt an artifact and restore its files
    #[arg(short, long)]
    pub decrypt: bool,

    /// RSA key in PEM format: public key to encrypt, private key to decrypt
    #[arg(long, env = "PPAP_KEY", value_name = "PATH")]
    pub key: Option<PathBuf>,

    /// Passphrase protecting the private key
    #[arg(short, long, env = "PPAP_PASSPHRASE", hide_env_values = true)]
    pub passphrase: Option<String>,

    /// Output file (encrypt) or directory (decrypt). An existing directory
    /// gets a timestamped name inside it; any other path is used exactly as
    /// given, with no `.zip` appended
    #[arg(short, long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Log each pipeline stage to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Which way a run goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Encrypt,
    Decrypt,
}

impl Cli {
    /// Resolve the mode from the flags, rejecting contradictory arguments.
    pub fn mode(&self) -> Result<Mode> {
        let mode = match (self.encrypt, self.decrypt) {
            (false, false) => {
                return Err(PpapError::Usage(
                    "--encrypt or --decrypt option is required".into(),
                ))
            }
            (true, true) => {
                return Err(PpapError::Usage(
                    "--encrypt and --decrypt options cannot be used together".into(),
                ))
            }
            (true, false) => Mode::Encrypt,
            (false, true) => Mode::Decrypt,
        };

        if mode == Mode::Decrypt && self.paths.len() != 1 {
            return Err(PpapError::Usage(
                "only one file can be selected for decryption".into(),
            ));
        }

        Ok(mode)
    }

    /// The key file to use: `--key` / `PPAP_KEY`, else the config default.
    pub fn key_path(&self, settings: &Settings, project_dir: &Path, mode: Mode) -> Result<PathBuf> {
        self.key
            .clone()
            .or_else(|| settings.default_key(project_dir, mode == Mode::Decrypt))
            .ok_or_else(|| {
                PpapError::Usage("a key file is required; pass --key <path> or set PPAP_KEY".into())
            })
    }
}

/// Get the passphrase for a private key, trying in order:
/// 1. `--passphrase` / `PPAP_PASSPHRASE`
/// 2. Interactive prompt, only if the key is protected and stdin is a terminal
///
/// Returns `None` when no passphrase is needed or none could be obtained;
/// key loading then reports what is missing.
pub fn key_passphrase(cli: &Cli, key_path: &Path) -> Result<Option<Zeroizing<String>>> {
    if let Some(pw) = &cli.passphrase {
        return Ok(Some(Zeroizing::new(pw.clone())));
    }

    if !is_passphrase_protected(key_path)? || !std::io::stdin().is_terminal() {
        return Ok(None);
    }

    let pw = dialoguer::Password::new()
        .with_prompt(format!("Passphrase for {}", key_path.display()))
        .allow_empty_password(true)
        .interact()
        .map_err(|e| PpapError::Usage(format!("passphrase prompt: {e}")))?;
    Ok(Some(Zeroizing::new(pw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ppap").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn encrypt_accepts_many_paths() {
        let cli = parse(&["-e", "a.txt", "dir1", "--key", "k.pem"]);
        assert_eq!(cli.mode().unwrap(), Mode::Encrypt);
        assert_eq!(cli.paths.len(), 2);
    }

    #[test]
    fn decrypt_accepts_one_path() {
        let cli = parse(&["--decrypt", "bundle.zip", "-p", "secret", "-o", "out"]);
        assert_eq!(cli.mode().unwrap(), Mode::Decrypt);
        assert_eq!(cli.passphrase.as_deref(), Some("secret"));
        assert_eq!(cli.out, Some(PathBuf::from("out")));
    }

    #[test]
    fn requires_a_mode() {
        let cli = parse(&["a.txt"]);
        let err = cli.mode().unwrap_err();
        assert!(err.to_string().contains("--encrypt or --decrypt"));
    }

    #[test]
    fn rejects_both_modes() {
        let cli = parse(&["-e", "-d", "a.txt"]);
        assert!(matches!(cli.mode(), Err(PpapError::Usage(_))));
    }

    #[test]
    fn decrypt_rejects_many_paths() {
        let cli = parse(&["-d", "a.zip", "b.zip"]);
        let err = cli.mode().unwrap_err();
        assert!(err.to_string().contains("only one file"));
    }

    #[test]
    fn out_help_says_path_is_verbatim() {
        use clap::CommandFactory;
        let cmd = Cli::command();
        let out = cmd
            .get_arguments()
            .find(|a| a.get_id() == "out")
            .unwrap();
        let help = out.get_long_help().or(out.get_help()).unwrap().to_string();
        assert!(help.contains("no `.zip` appended"));
    }

    #[test]
    fn paths_are_required() {
        assert!(Cli::try_parse_from(["ppap", "-e"]).is_err());
    }

    #[test]
    fn key_falls_back_to_settings() {
        let cli = parse(&["-e", "a.txt"]);
        let settings = Settings {
            encrypt_key: Some(PathBuf::from("keys/pub.pem")),
            ..Settings::default()
        };
        let project = Path::new("/proj");

        // PPAP_KEY may be set in the environment running the tests.
        if cli.key.is_none() {
            assert_eq!(
                cli.key_path(&settings, project, Mode::Encrypt).unwrap(),
                PathBuf::from("/proj/keys/pub.pem")
            );
            assert!(matches!(
                cli.key_path(&settings, project, Mode::Decrypt),
                Err(PpapError::Usage(_))
            ));
        }
    }
}
