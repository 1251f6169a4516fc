// SPDX-FileCopyrightText: 2026 Webgpg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the webgpg secret-protection subsystem.

use thiserror::Error;

/// The primary error type used across all webgpg crates.
///
/// Operators must be able to tell "server misconfigured" apart from "bad
/// credentials", so configuration problems get their own variant instead of
/// being folded into authentication failures.
#[derive(Debug, Error)]
pub enum WebgpgError {
    /// Required configuration is missing or unusable (e.g. no master
    /// password set).
    #[error("configuration error: {0}")]
    Config(String),

    /// Salt read/write failure in the backing store (database or file).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The secure random source failed. There is no fallback source.
    #[error("secure randomness unavailable: {0}")]
    Randomness(String),

    /// Caller-supplied input is not valid base64 or hex.
    #[error("decode error: {0}")]
    Decode(String),

    /// Caller-supplied input decoded but is structurally malformed.
    #[error("format error: {0}")]
    Format(String),

    /// Authenticated decryption failed -- wrong key or corrupted data.
    /// The message is deliberately generic.
    #[error("decryption failed")]
    Authentication,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
