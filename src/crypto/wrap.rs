//! RSA-OAEP envelope for the symmetric passphrase.
//!
//! Only the passphrase goes through RSA; bulk data never does. The
//! wrapped form travels inside the final artifact as lowercase hex.

use rand_core::OsRng;
use rsa::Oaep;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::keys::{DecryptionKey, EncryptionKey};
use super::passphrase::SymmetricPassphrase;
use crate::errors::{PpapError, Result};

/// Digest used for both the OAEP label hash and MGF1.
///
/// SHA-1 is the default because it is what most OAEP implementations
/// pick when nothing is specified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OaepDigest {
    #[default]
    Sha1,
    Sha256,
}

impl OaepDigest {
    /// Digest output length in bytes (`hLen`).
    pub fn output_len(self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
        }
    }

    fn padding(self) -> Oaep {
        match self {
            Self::Sha1 => Oaep::new::<sha1::Sha1>(),
            Self::Sha256 => Oaep::new::<sha2::Sha256>(),
        }
    }
}

/// Largest plaintext, in bytes, OAEP can wrap under a `modulus_len`-byte key.
pub fn max_wrap_len(modulus_len: usize, digest: OaepDigest) -> usize {
    modulus_len.saturating_sub(2 * digest.output_len() + 2)
}

/// A passphrase encrypted under the recipient's public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedPassphrase(Vec<u8>);

impl WrappedPassphrase {
    /// Parse the hex form stored in the artifact.
    ///
    /// Malformed hex is reported as an unwrap failure, the same as any
    /// other corruption of the wrapped passphrase.
    pub fn from_hex(text: &str) -> Result<Self> {
        hex::decode(text.trim())
            .map(Self)
            .map_err(|_| PpapError::UnwrapFailed)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Encrypt `passphrase` under `key`.
///
/// Refuses, rather than truncates, a passphrase that does not fit.
pub fn wrap(
    passphrase: &SymmetricPassphrase,
    key: &EncryptionKey,
    digest: OaepDigest,
) -> Result<WrappedPassphrase> {
    let max = max_wrap_len(key.size(), digest);
    if passphrase.len() > max {
        return Err(PpapError::PassphraseTooLarge {
            len: passphrase.len(),
            max,
            bits: key.bits(),
        });
    }

    let ciphertext = key
        .rsa()
        .encrypt(&mut OsRng, digest.padding(), passphrase.as_bytes())
        .map_err(|e| PpapError::WrapFailed(e.to_string()))?;

    Ok(WrappedPassphrase(ciphertext))
}

/// Decrypt a wrapped passphrase with `key`.
///
/// Every failure collapses into `PpapError::UnwrapFailed` so callers can't
/// tell which check rejected the input.
pub fn unwrap(
    wrapped: &WrappedPassphrase,
    key: &DecryptionKey,
    digest: OaepDigest,
) -> Result<SymmetricPassphrase> {
    if wrapped.0.len() != key.size() {
        return Err(PpapError::UnwrapFailed);
    }

    let plaintext = key
        .rsa()
        .decrypt_blinded(&mut OsRng, digest.padding(), &wrapped.0)
        .map(Zeroizing::new)
        .map_err(|_| PpapError::UnwrapFailed)?;

    SymmetricPassphrase::from_plaintext(plaintext)
}
