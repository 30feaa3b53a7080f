//! Integration tests for the ppap CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`. Every
//! run gets its own working directory and a scrubbed environment so a
//! developer's `PPAP_*` variables cannot leak in.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

/// Helper: get a Command pointing at the ppap binary, run inside `dir`.
fn ppap(dir: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("ppap").expect("binary should exist");
    cmd.current_dir(dir)
        .env_remove("PPAP_KEY")
        .env_remove("PPAP_PASSPHRASE")
        .env_remove("PPAP_LOG");
    cmd
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/keys")
        .join(name)
}

fn sample_tree(tmp: &TempDir) {
    tmp.child("docs/a.txt").write_str("alpha\n").unwrap();
    tmp.child("dir1/b.txt").write_str("bravo\n").unwrap();
    tmp.child("dir1/sub/c.txt").write_str("charlie\n").unwrap();
}

// ---------------------------------------------------------------------------
// Argument handling
// ---------------------------------------------------------------------------

#[test]
fn help_flag_shows_usage() {
    let tmp = TempDir::new().unwrap();
    ppap(tmp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--encrypt"))
        .stdout(predicate::str::contains("--decrypt"))
        .stdout(predicate::str::contains("--key"));
}

#[test]
fn version_flag_shows_version() {
    let tmp = TempDir::new().unwrap();
    ppap(tmp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ppap"));
}

#[test]
fn no_paths_is_a_usage_error() {
    let tmp = TempDir::new().unwrap();
    ppap(tmp.path())
        .arg("-e")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn mode_is_required() {
    let tmp = TempDir::new().unwrap();
    ppap(tmp.path())
        .arg("a.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--encrypt or --decrypt option is required"));
}

#[test]
fn modes_are_exclusive() {
    let tmp = TempDir::new().unwrap();
    ppap(tmp.path())
        .args(["-e", "-d", "a.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "--encrypt and --decrypt options cannot be used together",
        ));
}

#[test]
fn decrypt_takes_one_file() {
    let tmp = TempDir::new().unwrap();
    ppap(tmp.path())
        .args(["-d", "one.zip", "two.zip"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "only one file can be selected for decryption",
        ));
}

#[test]
fn encrypt_without_key_fails() {
    let tmp = TempDir::new().unwrap();
    sample_tree(&tmp);
    ppap(tmp.path())
        .args(["-e", "docs/a.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("a key file is required"));
}

// ---------------------------------------------------------------------------
// Encrypt / decrypt through the binary
// ---------------------------------------------------------------------------

#[test]
fn binary_roundtrip() {
    let tmp = TempDir::new().unwrap();
    sample_tree(&tmp);

    ppap(tmp.path())
        .args(["-e", "docs/a.txt", "dir1", "-o", "bundle.zip", "--key"])
        .arg(fixture("recipient.pub.pem"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Encrypted 2 item(s)"));

    tmp.child("bundle.zip").assert(predicate::path::is_file());

    ppap(tmp.path())
        .args(["-d", "bundle.zip", "-o", "restored", "--key"])
        .arg(fixture("recipient.pem"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored files to"));

    tmp.child("restored/docs/a.txt").assert("alpha\n");
    tmp.child("restored/dir1/b.txt").assert("bravo\n");
    tmp.child("restored/dir1/sub/c.txt").assert("charlie\n");
}

#[test]
fn missing_input_is_a_warning() {
    let tmp = TempDir::new().unwrap();
    sample_tree(&tmp);

    ppap(tmp.path())
        .args(["-e", "docs/a.txt", "ghost.txt", "-o", "bundle.zip", "--key"])
        .arg(fixture("recipient.pub.pem"))
        .assert()
        .success()
        .stderr(predicate::str::contains("ghost.txt: file or directory not found"));

    tmp.child("bundle.zip").assert(predicate::path::is_file());
}

#[test]
fn only_missing_inputs_fails() {
    let tmp = TempDir::new().unwrap();

    ppap(tmp.path())
        .args(["-e", "ghost.txt", "--key"])
        .arg(fixture("recipient.pub.pem"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to encrypt"));
}

#[test]
fn key_from_environment_and_protected_key_passphrase() {
    let tmp = TempDir::new().unwrap();
    sample_tree(&tmp);

    ppap(tmp.path())
        .args(["-e", "dir1", "-o", "bundle.zip"])
        .env("PPAP_KEY", fixture("recipient.pub.pem"))
        .assert()
        .success();

    ppap(tmp.path())
        .args(["-d", "bundle.zip", "-o", "restored"])
        .env("PPAP_KEY", fixture("recipient.enc.pem"))
        .env("PPAP_PASSPHRASE", "correct-horse")
        .assert()
        .success();

    tmp.child("restored/dir1/b.txt").assert("bravo\n");
}

#[test]
fn keys_from_config_file() {
    let tmp = TempDir::new().unwrap();
    sample_tree(&tmp);
    tmp.child(".ppap.toml")
        .write_str(&format!(
            "encrypt_key = {:?}\ndecrypt_key = {:?}\noaep_digest = \"sha256\"\n",
            fixture("recipient.pub.pem").display().to_string(),
            fixture("recipient.pem").display().to_string(),
        ))
        .unwrap();

    ppap(tmp.path())
        .args(["-e", "docs/a.txt", "-o", "bundle.zip"])
        .assert()
        .success();
    ppap(tmp.path())
        .args(["-d", "bundle.zip", "-o", "restored"])
        .assert()
        .success();

    tmp.child("restored/docs/a.txt").assert("alpha\n");
}

#[test]
fn wrong_key_fails_without_output() {
    let tmp = TempDir::new().unwrap();
    sample_tree(&tmp);

    ppap(tmp.path())
        .args(["-e", "docs/a.txt", "-o", "bundle.zip", "--key"])
        .arg(fixture("recipient.pub.pem"))
        .assert()
        .success();

    ppap(tmp.path())
        .args(["-d", "bundle.zip", "-o", "restored", "--key"])
        .arg(fixture("stranger.pem"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("wrong key or corrupted artifact"));

    tmp.child("restored").assert(predicate::path::missing());
}

#[test]
fn small_key_is_rejected() {
    let tmp = TempDir::new().unwrap();
    sample_tree(&tmp);

    ppap(tmp.path())
        .args(["-e", "docs/a.txt", "-o", "bundle.zip", "--key"])
        .arg(fixture("small.pub.pem"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("2048-bit"));

    tmp.child("bundle.zip").assert(predicate::path::missing());
}

#[test]
fn verbose_logs_each_stage() {
    let tmp = TempDir::new().unwrap();
    sample_tree(&tmp);

    ppap(tmp.path())
        .args(["-v", "-e", "docs/a.txt", "-o", "bundle.zip", "--key"])
        .arg(fixture("recipient.pub.pem"))
        .assert()
        .success()
        .stderr(predicate::str::contains("STAGE"))
        .stderr(predicate::str::contains("WRAP_KEY"))
        .stderr(predicate::str::contains("CLEANUP"));
}
