//! RSA key loading.
//!
//! Keys are read from PEM files and bound to a role up front: an
//! `EncryptionKey` can only wrap, a `DecryptionKey` can only unwrap.
//! The PEM label decides which decoder runs:
//!
//! | label                   | encoding          |
//! |-------------------------|-------------------|
//! | `PUBLIC KEY`            | SPKI              |
//! | `RSA PUBLIC KEY`        | PKCS#1            |
//! | `PRIVATE KEY`           | PKCS#8            |
//! | `RSA PRIVATE KEY`       | PKCS#1            |
//! | `ENCRYPTED PRIVATE KEY` | PKCS#8 with PBES2 |

use std::fs;
use std::path::Path;

use pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use zeroize::Zeroizing;

use crate::errors::{PpapError, Result};

/// A public key used to wrap passphrases.
#[derive(Debug, Clone)]
pub struct EncryptionKey {
    key: RsaPublicKey,
}

/// A private key used to unwrap passphrases.
#[derive(Clone)]
pub struct DecryptionKey {
    key: RsaPrivateKey,
}

impl std::fmt::Debug for DecryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecryptionKey")
            .field("bits", &(self.key.size() * 8))
            .finish_non_exhaustive()
    }
}

impl EncryptionKey {
    /// Load a public key from `path`.
    ///
    /// Private key files are accepted too; only their public half is kept.
    /// A passphrase-protected private key cannot be used here.
    pub fn load(path: &Path) -> Result<Self> {
        let pem = read_pem(path)?;
        let key = match pem_label(&pem) {
            Some("PUBLIC KEY") => RsaPublicKey::from_public_key_pem(&pem)
                .map_err(|e| key_error(path, format!("invalid SPKI public key: {e}")))?,
            Some("RSA PUBLIC KEY") => RsaPublicKey::from_pkcs1_pem(&pem)
                .map_err(|e| key_error(path, format!("invalid PKCS#1 public key: {e}")))?,
            _ => DecryptionKey::decode(path, &pem, None)?.key.to_public_key(),
        };
        Ok(Self { key })
    }

    /// Modulus size in bits.
    pub fn bits(&self) -> usize {
        self.key.size() * 8
    }

    /// Modulus size in bytes; this is also the length of every ciphertext.
    pub fn size(&self) -> usize {
        self.key.size()
    }

    pub(crate) fn rsa(&self) -> &RsaPublicKey {
        &self.key
    }
}

impl DecryptionKey {
    /// Load a private key from `path`, unlocking it with `passphrase` when
    /// the file is passphrase-protected.
    pub fn load(path: &Path, passphrase: Option<&str>) -> Result<Self> {
        let pem = read_pem(path)?;
        Self::decode(path, &pem, passphrase)
    }

    /// The public half, for encrypting to this key.
    pub fn encryption_key(&self) -> EncryptionKey {
        EncryptionKey {
            key: self.key.to_public_key(),
        }
    }

    /// Modulus size in bytes.
    pub fn size(&self) -> usize {
        self.key.size()
    }

    pub(crate) fn rsa(&self) -> &RsaPrivateKey {
        &self.key
    }

    fn decode(path: &Path, pem: &str, passphrase: Option<&str>) -> Result<Self> {
        let key = match pem_label(pem) {
            Some("PRIVATE KEY") => RsaPrivateKey::from_pkcs8_pem(pem)
                .map_err(|e| key_error(path, format!("invalid PKCS#8 private key: {e}")))?,
            Some("RSA PRIVATE KEY") => {
                if pem.contains("Proc-Type: 4,ENCRYPTED") {
                    return Err(key_error(
                        path,
                        "legacy encrypted PEM is not supported; convert it with \
                         `openssl pkcs8 -topk8 -v2 aes-256-cbc`"
                            .into(),
                    ));
                }
                RsaPrivateKey::from_pkcs1_pem(pem)
                    .map_err(|e| key_error(path, format!("invalid PKCS#1 private key: {e}")))?
            }
            Some("ENCRYPTED PRIVATE KEY") => {
                let passphrase = passphrase.ok_or_else(|| {
                    key_error(
                        path,
                        "private key is passphrase-protected; a passphrase is required".into(),
                    )
                })?;
                RsaPrivateKey::from_pkcs8_encrypted_pem(pem, passphrase.as_bytes())
                    .map_err(|_| key_error(path, "wrong passphrase or corrupted private key".into()))?
            }
            Some("PUBLIC KEY" | "RSA PUBLIC KEY") => {
                return Err(key_error(
                    path,
                    "this is a public key; decryption needs the private key".into(),
                ));
            }
            Some(other) => {
                return Err(key_error(path, format!("unsupported PEM type '{other}'")));
            }
            None => return Err(key_error(path, "not a PEM-encoded key".into())),
        };
        Ok(Self { key })
    }
}

/// Whether the key file at `path` needs a passphrase to be loaded.
pub fn is_passphrase_protected(path: &Path) -> Result<bool> {
    let pem = read_pem(path)?;
    Ok(matches!(pem_label(&pem), Some("ENCRYPTED PRIVATE KEY"))
        || pem.contains("Proc-Type: 4,ENCRYPTED"))
}

fn read_pem(path: &Path) -> Result<Zeroizing<String>> {
    if !path.exists() {
        return Err(key_error(path, "key file not found".into()));
    }
    fs::read_to_string(path)
        .map(Zeroizing::new)
        .map_err(|e| key_error(path, format!("cannot read key file: {e}")))
}

/// Extract the label of the first PEM block, e.g. `PUBLIC KEY`.
fn pem_label(pem: &str) -> Option<&str> {
    pem.lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("-----BEGIN "))
        .and_then(|rest| rest.strip_suffix("-----"))
}

fn key_error(path: &Path, reason: String) -> PpapError {
    PpapError::KeyLoad {
        path: path.to_path_buf(),
        reason,
    }
}
