// SPDX-FileCopyrightText: 2026 Webgpg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argon2id master-key derivation from the master password.
//!
//! Derives a 32-byte key using Argon2id (Algorithm::Argon2id, Version::V0x13)
//! with cost parameters from [`KdfConfig`]. Derivation is deterministic:
//! identical password, salt, and parameters always produce the same key,
//! which is what makes envelopes decryptable across restarts.

use ring::rand::{SecureRandom, SystemRandom};
use webgpg_config::KdfConfig;
use webgpg_core::WebgpgError;
use zeroize::Zeroizing;

/// Length of the persisted salt in bytes.
pub const SALT_LEN: usize = 16;

/// Length of the derived master key in bytes.
pub const KEY_LEN: usize = 32;

/// Derive a 32-byte key from a password using Argon2id.
///
/// The returned key is wrapped in [`Zeroizing`] for automatic memory zeroing
/// on drop. Cost parameters are normalized at config load, so parameter
/// construction failing here is an internal error, not an operator one.
pub fn derive(
    password: &[u8],
    salt: &[u8; SALT_LEN],
    config: &KdfConfig,
) -> Result<Zeroizing<[u8; KEY_LEN]>, WebgpgError> {
    let params = argon2::Params::new(
        config.memory_kib,
        config.iterations,
        config.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| WebgpgError::Internal(format!("invalid Argon2id parameters: {e}")))?;

    let argon2 = argon2::Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let mut output = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(password, salt, output.as_mut())
        .map_err(|e| WebgpgError::Internal(format!("Argon2id key derivation failed: {e}")))?;

    Ok(output)
}

/// Generate a random 16-byte salt.
pub fn generate_salt() -> Result<[u8; SALT_LEN], WebgpgError> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| WebgpgError::Randomness("failed to generate random salt".to_string()))?;
    Ok(salt)
}
