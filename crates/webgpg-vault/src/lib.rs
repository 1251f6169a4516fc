// SPDX-FileCopyrightText: 2026 Webgpg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential and secret-protection subsystem for webgpg.
//!
//! A master key is derived from an administrator-supplied password via
//! Argon2id over a persisted random salt. That key protects private-key
//! passphrases at rest (AES-256-GCM envelopes) and signs stateless session
//! tokens (HMAC-SHA256 over a timestamp) that gate the application. The
//! web layer calls in through [`Vault`]; everything else here is plumbing
//! for it.

pub mod crypto;
pub mod kdf;
pub mod prompt;
pub mod salt;
pub mod token;
pub mod vault;

pub use prompt::resolve_master_password;
pub use salt::SaltStore;
pub use vault::Vault;
