//! Archive formats used by the encrypt/decrypt pipeline.
//!
//! This module provides:
//! - Staging inputs into an uncompressed tar container (`stage`)
//! - Password-protected zip of that container (`seal`)
//! - The outer two-member zip that is the final artifact (`package`)

pub mod package;
pub mod seal;
pub mod stage;

pub use package::{package, unpack, Unpacked, WRAPPED_KEY_NAME};
pub use seal::{open, seal, ArchiveCipher, SealOptions, ENCRYPTED_ARCHIVE_NAME};
pub use stage::{stage, unstage, EntryKind, StageReport, StagedEntry, CONTAINER_NAME};
