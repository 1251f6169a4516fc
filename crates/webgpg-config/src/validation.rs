// SPDX-FileCopyrightText: 2026 Webgpg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes. KDF cost parameters are NOT validated here; a bad override
//! keeps its default during normalization instead of failing startup.

use crate::diagnostic::ConfigError;
use crate::model::WebgpgConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &WebgpgConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.auth.token_max_age_seconds <= 0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "auth.token_max_age_seconds must be positive, got {}",
                config.auth.token_max_age_seconds
            ),
        });
    }

    if let Some(ref password) = config.auth.master_password
        && password.is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "auth.master_password must not be empty when set; omit it to disable authentication".to_string(),
        });
    }

    if config.storage.salt_file.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.salt_file must not be empty".to_string(),
        });
    }

    if let Some(ref path) = config.storage.database_path
        && path.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty when set".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
