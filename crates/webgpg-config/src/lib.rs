// SPDX-FileCopyrightText: 2026 Webgpg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for webgpg.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, environment variable
//! overrides, and miette diagnostic rendering.
//!
//! # Usage
//!
//! ```no_run
//! use webgpg_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("token window: {}s", config.auth.token_max_age_seconds);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{AuthConfig, KdfConfig, StorageConfig, WebgpgConfig};

/// Load configuration from the XDG hierarchy and validate it.
///
/// This is the high-level entry point that:
/// 1. Loads config from TOML files + env vars via Figment
/// 2. Normalizes out-of-range KDF overrides back to their defaults
/// 3. Runs post-deserialization validation
pub fn load_and_validate() -> Result<WebgpgConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(mut config) => {
            config.normalize();
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<WebgpgConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(mut config) => {
            config.normalize();
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}
