//! Parsing and validation of `partplace.toml` solver configuration files.
//!
//! This crate reads the optional configuration file and produces a
//! strongly-typed [`PlannerConfig`] holding search tuning knobs and the
//! ideal-center oracle settings. Every field has a default, so an absent file
//! is equivalent to an empty one.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, validate_config, CONFIG_FILE_NAME};
pub use types::*;
