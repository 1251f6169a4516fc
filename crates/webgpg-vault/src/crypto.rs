// SPDX-FileCopyrightText: 2026 Webgpg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM passphrase envelopes.
//!
//! Every call to [`seal`] generates a fresh random 96-bit nonce via the
//! system CSPRNG. Nonce reuse would be catastrophic for GCM security.
//!
//! Envelope wire format: standard-alphabet `base64(nonce || ciphertext || tag)`,
//! stored as an opaque string alongside the record it protects.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use ring::aead::{AES_256_GCM, Aad, LessSafeKey, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};
use webgpg_core::WebgpgError;

use crate::kdf::KEY_LEN;

/// AES-256-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// AES-256-GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Encrypt plaintext under `key`, returning the base64 envelope.
pub fn seal(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<String, WebgpgError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| WebgpgError::Internal("failed to create AES-256-GCM key".to_string()))?;
    let less_safe = LessSafeKey::new(unbound);

    // Fresh random 96-bit nonce, never reused across calls.
    let rng = SystemRandom::new();
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill(&mut nonce_bytes)
        .map_err(|_| WebgpgError::Randomness("failed to generate random nonce".to_string()))?;

    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    // Seal in place: plaintext buffer is extended with the authentication tag.
    let mut in_out = plaintext.to_vec();
    less_safe
        .seal_in_place_append_tag(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| WebgpgError::Internal("AES-256-GCM encryption failed".to_string()))?;

    let mut payload = Vec::with_capacity(NONCE_LEN + in_out.len());
    payload.extend_from_slice(&nonce_bytes);
    payload.extend_from_slice(&in_out);
    Ok(BASE64.encode(payload))
}

/// Decrypt a base64 envelope produced by [`seal`].
///
/// Fails with `Decode` on invalid base64, `Format` when the payload is
/// shorter than one nonce, and `Authentication` when the tag does not verify
/// (covers both corruption and a wrong key). No partial plaintext is ever
/// returned.
pub fn open(key: &[u8; KEY_LEN], envelope: &str) -> Result<Vec<u8>, WebgpgError> {
    let payload = BASE64
        .decode(envelope.trim())
        .map_err(|e| WebgpgError::Decode(format!("envelope is not valid base64: {e}")))?;

    if payload.len() < NONCE_LEN {
        return Err(WebgpgError::Format("envelope shorter than one nonce".to_string()));
    }

    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| WebgpgError::Internal("failed to create AES-256-GCM key".to_string()))?;
    let less_safe = LessSafeKey::new(unbound);

    let nonce_bytes: [u8; NONCE_LEN] = payload[..NONCE_LEN]
        .try_into()
        .expect("length checked above");
    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    let mut in_out = payload[NONCE_LEN..].to_vec();
    let plaintext = less_safe
        .open_in_place(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| WebgpgError::Authentication)?;

    Ok(plaintext.to_vec())
}
