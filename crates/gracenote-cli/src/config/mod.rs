//! Application configuration module.
//!
//! Manages the TOML config file holding API endpoint settings, the
//! channel allow-list and force-series rules.

#[allow(clippy::module_inception)]
mod config;
mod paths;

#[allow(clippy::module_name_repetitions)]
pub use config::{ApiConfig, AppConfig};
pub use paths::resolve_config_path;
