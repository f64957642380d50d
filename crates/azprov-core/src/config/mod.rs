//! Configuration for azprov
//!
// Allow nested config module - this is intentional for the config subsystem

#![allow(clippy::module_inception)]
//!
//! An optional TOML file can supply the provisioning inputs and endpoint
//! overrides. It supports `${VAR}` / `${VAR:-default}` expansion and lives at
//! the platform config location unless a path is given explicitly.

pub mod config;
pub mod error;

// Re-export main types for convenience
pub use config::Config;
pub use error::{ConfigError, Result};
