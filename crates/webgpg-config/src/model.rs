// SPDX-FileCopyrightText: 2026 Webgpg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for webgpg.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Top-level webgpg configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WebgpgConfig {
    /// Master password and session token settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Argon2id cost parameters for master key derivation.
    #[serde(default)]
    pub kdf: KdfConfig,

    /// Salt persistence settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl WebgpgConfig {
    /// Replace out-of-range values with their defaults.
    ///
    /// A non-positive KDF cost override keeps the default for that parameter
    /// rather than failing startup; each replacement is logged.
    pub fn normalize(&mut self) {
        self.kdf.normalize();
    }
}

/// Master password and session token configuration.
///
/// The master password is intentionally NOT persisted by webgpg; it arrives
/// through configuration (or the environment) at process start. Its absence
/// is a detectable state, surfaced to operators as a configuration error
/// rather than to users as a login failure.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Reference master password. When unset, login and passphrase
    /// protection are disabled and report a configuration error.
    #[serde(default)]
    pub master_password: Option<String>,

    /// Session token validity window in seconds.
    #[serde(default = "default_token_max_age_seconds")]
    pub token_max_age_seconds: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            master_password: None,
            token_max_age_seconds: default_token_max_age_seconds(),
        }
    }
}

fn default_token_max_age_seconds() -> i64 {
    24 * 60 * 60
}

/// Argon2id cost parameters for deriving the 32-byte master key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KdfConfig {
    /// Iteration count (default: 1).
    #[serde(default = "default_kdf_iterations")]
    pub iterations: u32,

    /// Memory cost in KiB (default: 32768 = 32 MiB).
    #[serde(default = "default_kdf_memory_kib")]
    pub memory_kib: u32,

    /// Parallelism lanes (default: 2).
    #[serde(default = "default_kdf_parallelism")]
    pub parallelism: u32,
}

impl KdfConfig {
    /// Replace zero-valued cost parameters with their defaults.
    ///
    /// Changing any of these after envelopes exist changes the derived key
    /// and makes existing envelopes undecryptable, so a bad override keeps
    /// the default instead of producing a surprise key.
    pub fn normalize(&mut self) {
        if self.iterations == 0 {
            warn!("kdf.iterations must be positive; keeping default {}", default_kdf_iterations());
            self.iterations = default_kdf_iterations();
        }
        if self.memory_kib == 0 {
            warn!("kdf.memory_kib must be positive; keeping default {}", default_kdf_memory_kib());
            self.memory_kib = default_kdf_memory_kib();
        }
        if self.parallelism == 0 {
            warn!("kdf.parallelism must be positive; keeping default {}", default_kdf_parallelism());
            self.parallelism = default_kdf_parallelism();
        }
    }
}

impl Default for KdfConfig {
    fn default() -> Self {
        Self {
            iterations: default_kdf_iterations(),
            memory_kib: default_kdf_memory_kib(),
            parallelism: default_kdf_parallelism(),
        }
    }
}

fn default_kdf_iterations() -> u32 {
    1
}

fn default_kdf_memory_kib() -> u32 {
    32 * 1024
}

fn default_kdf_parallelism() -> u32 {
    2
}

/// Salt persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database. When set, the salt lives in the
    /// `secrets` table; when unset, `salt_file` is used instead.
    #[serde(default)]
    pub database_path: Option<String>,

    /// Path of the salt file used when no database is configured.
    #[serde(default = "default_salt_file")]
    pub salt_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            salt_file: default_salt_file(),
        }
    }
}

fn default_salt_file() -> String {
    "./data/master_salt".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = WebgpgConfig::default();
        assert!(config.auth.master_password.is_none());
        assert_eq!(config.auth.token_max_age_seconds, 86400);
        assert_eq!(config.kdf.iterations, 1);
        assert_eq!(config.kdf.memory_kib, 32768);
        assert_eq!(config.kdf.parallelism, 2);
        assert!(config.storage.database_path.is_none());
        assert_eq!(config.storage.salt_file, "./data/master_salt");
    }

    #[test]
    fn normalize_keeps_defaults_for_zero_overrides() {
        let mut kdf = KdfConfig {
            iterations: 0,
            memory_kib: 0,
            parallelism: 0,
        };
        kdf.normalize();
        assert_eq!(kdf, KdfConfig::default());
    }

    #[test]
    fn normalize_preserves_positive_overrides() {
        let mut kdf = KdfConfig {
            iterations: 4,
            memory_kib: 65536,
            parallelism: 0,
        };
        kdf.normalize();
        assert_eq!(kdf.iterations, 4);
        assert_eq!(kdf.memory_kib, 65536);
        assert_eq!(kdf.parallelism, 2);
    }
}
