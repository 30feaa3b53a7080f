//! One module per mode; each exposes `execute`.

pub mod decrypt;
pub mod encrypt;
