//! Project configuration (`.ppap.toml`).

pub mod settings;

pub use settings::Settings;
