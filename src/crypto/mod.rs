//! Cryptographic building blocks for ppap.
//!
//! This module provides:
//! - RSA key loading bound to an encrypt or decrypt role (`keys`)
//! - The random per-operation symmetric passphrase (`passphrase`)
//! - RSA-OAEP wrapping of that passphrase (`wrap`)

pub mod keys;
pub mod passphrase;
pub mod wrap;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{EncryptionKey, wrap, unwrap, ...};
pub use keys::{is_passphrase_protected, DecryptionKey, EncryptionKey};
pub use passphrase::SymmetricPassphrase;
pub use wrap::{max_wrap_len, unwrap, wrap, OaepDigest, WrappedPassphrase};
