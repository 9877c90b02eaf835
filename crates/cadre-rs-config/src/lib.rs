//! Configuration models and file loading for Cadre.
//!
//! This crate owns the Cadre config schema and the json5 loader used by
//! the server binary and SDK embedders.

mod error;
mod loader;
mod model;

/// Public error type returned by config loading APIs.
pub use error::ConfigError;
/// Config file loader entry points.
pub use loader::{default_config_path, load_config};
/// Configuration schema models.
pub use model::*;
