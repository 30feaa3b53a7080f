//! The per-operation symmetric passphrase.
//!
//! 128 random bytes, hex-encoded, so the passphrase is 256 ASCII
//! characters. It lives only in memory and is wiped on drop.

use std::fmt;

use rand::RngCore;
use zeroize::Zeroizing;

use crate::errors::{PpapError, Result};

/// Number of random bytes behind each passphrase.
pub const PASSPHRASE_ENTROPY_BYTES: usize = 128;

/// Length of the encoded passphrase in bytes.
pub const PASSPHRASE_LEN: usize = PASSPHRASE_ENTROPY_BYTES * 2;

/// A symmetric passphrase that zeroes its memory when dropped.
///
/// `Debug` never prints the value.
pub struct SymmetricPassphrase(Zeroizing<String>);

impl SymmetricPassphrase {
    /// Generate a fresh passphrase from the thread-local CSPRNG.
    pub fn generate() -> Self {
        let mut raw = Zeroizing::new([0u8; PASSPHRASE_ENTROPY_BYTES]);
        rand::rng().fill_bytes(raw.as_mut_slice());
        Self(Zeroizing::new(hex::encode(raw.as_slice())))
    }

    /// Rebuild a passphrase from unwrapped plaintext bytes.
    pub(crate) fn from_plaintext(bytes: Zeroizing<Vec<u8>>) -> Result<Self> {
        match std::str::from_utf8(&bytes) {
            Ok(text) => Ok(Self(Zeroizing::new(text.to_owned()))),
            Err(_) => Err(PpapError::UnwrapFailed),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SymmetricPassphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricPassphrase(<redacted>)")
    }
}
