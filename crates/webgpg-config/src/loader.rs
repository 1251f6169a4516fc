// SPDX-FileCopyrightText: 2026 Webgpg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./webgpg.toml` > `~/.config/webgpg/webgpg.toml`
//! > `/etc/webgpg/webgpg.toml` with environment variable overrides via the
//! `WEBGPG_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::WebgpgConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/webgpg/webgpg.toml` (system-wide)
/// 3. `~/.config/webgpg/webgpg.toml` (user XDG config)
/// 4. `./webgpg.toml` (local directory)
/// 5. `WEBGPG_*` environment variables
pub fn load_config() -> Result<WebgpgConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WebgpgConfig::default()))
        .merge(Toml::file("/etc/webgpg/webgpg.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("webgpg/webgpg.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("webgpg.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<WebgpgConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WebgpgConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<WebgpgConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WebgpgConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `WEBGPG_AUTH_MASTER_PASSWORD` must map
/// to `auth.master_password`, not `auth.master.password`.
fn env_provider() -> Env {
    Env::prefixed("WEBGPG_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: WEBGPG_AUTH_MASTER_PASSWORD -> "auth_master_password"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("auth_", "auth.", 1)
            .replacen("kdf_", "kdf.", 1)
            .replacen("storage_", "storage.", 1);
        mapped.into()
    })
}
