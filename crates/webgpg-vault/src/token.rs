// SPDX-FileCopyrightText: 2026 Webgpg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signed session tokens: `"<unix-seconds>:<lowercase-hex-hmac-sha256>"`.
//!
//! The MAC authenticates only the decimal timestamp string, keyed by the
//! derived master key. There is no server-side token state; expiry is the
//! only invalidation path besides salt or password rotation. Callers carry
//! the token as an opaque bearer value (e.g. a cookie).
//!
//! Both functions take `now` explicitly so the expiry boundary is exact and
//! testable; [`crate::vault::Vault`] supplies wall-clock time.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::kdf::KEY_LEN;

type HmacSha256 = Hmac<Sha256>;

/// Create a signed token for the current moment.
pub fn issue(key: &[u8; KEY_LEN], now: i64) -> String {
    let payload = now.to_string();
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(payload.as_bytes());
    let sig = mac.finalize().into_bytes();
    format!("{payload}:{}", hex::encode(sig))
}

/// Validate a token against `key` and the allowed age window.
///
/// Never panics and never errors: every failure mode (structure, hex, MAC,
/// timestamp parse, expiry) yields `false`. A token is valid through exactly
/// `max_age_seconds` of age, inclusive. Future-dated timestamps verify,
/// since producing one requires the master key in the first place.
pub fn verify(key: &[u8; KEY_LEN], token: &str, max_age_seconds: i64, now: i64) -> bool {
    let Some((payload, sig_hex)) = token.split_once(':') else {
        return false;
    };
    let Ok(sig) = hex::decode(sig_hex) else {
        return false;
    };

    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(payload.as_bytes());
    if mac.verify_slice(&sig).is_err() {
        return false;
    }

    let Ok(timestamp) = payload.parse::<i64>() else {
        return false;
    };
    now - timestamp <= max_age_seconds
}
