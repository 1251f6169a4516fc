// SPDX-FileCopyrightText: 2026 Webgpg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault facade: master password verification, passphrase envelopes, and
//! session tokens, all keyed by one derived master key.
//!
//! The master key is a pure function of (configured password, persisted
//! salt, KDF parameters). It is recomputed per operation and never
//! persisted; derivation is intentionally slow (hundreds of milliseconds at
//! default cost), so callers must budget for that latency on every
//! password-verification and passphrase-protection call.

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use webgpg_config::{KdfConfig, WebgpgConfig};
use webgpg_core::WebgpgError;
use zeroize::Zeroizing;

use crate::crypto;
use crate::kdf::{self, KEY_LEN};
use crate::salt::SaltStore;
use crate::token;

/// The credential and secret-protection subsystem.
///
/// Debug output intentionally omits the master password.
pub struct Vault {
    master_password: Option<SecretString>,
    kdf: KdfConfig,
    salt: SaltStore,
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("master_password", &self.master_password.as_ref().map(|_| "[REDACTED]"))
            .field("salt", &self.salt)
            .finish()
    }
}

impl Vault {
    /// Build a vault from an explicit password, KDF parameters, and salt
    /// store. An empty password counts as unconfigured.
    pub fn new(master_password: Option<SecretString>, kdf: KdfConfig, salt: SaltStore) -> Self {
        let master_password =
            master_password.filter(|p| !p.expose_secret().is_empty());
        Self {
            master_password,
            kdf,
            salt,
        }
    }

    /// Build a vault from loaded configuration plus a salt store.
    pub fn from_config(config: &WebgpgConfig, salt: SaltStore) -> Self {
        Self::new(
            config.auth.master_password.clone().map(SecretString::from),
            config.kdf.clone(),
            salt,
        )
    }

    /// Whether a master password is configured at all.
    ///
    /// Lets the web layer distinguish "authentication disabled" from a
    /// failed login before asking anyone for credentials.
    pub fn is_configured(&self) -> bool {
        self.master_password.is_some()
    }

    /// Derive the 32-byte master key from the configured password and the
    /// persisted salt.
    async fn master_key(&self) -> Result<Zeroizing<[u8; KEY_LEN]>, WebgpgError> {
        let password = self.master_password.as_ref().ok_or_else(|| {
            WebgpgError::Config("master password not configured".to_string())
        })?;
        let salt = self.salt.get_or_create().await?;
        kdf::derive(password.expose_secret().as_bytes(), &salt, &self.kdf)
    }

    /// Check a candidate password against the configured one.
    ///
    /// Raw passwords are never compared; both are run through the KDF with
    /// the same salt and the derived keys are compared in constant time.
    /// Derivation or storage failures propagate as errors, never as `false`.
    pub async fn verify_master_password(&self, candidate: &str) -> Result<bool, WebgpgError> {
        let reference = self.master_password.as_ref().ok_or_else(|| {
            WebgpgError::Config("master password not configured".to_string())
        })?;
        let salt = self.salt.get_or_create().await?;

        let candidate_key = kdf::derive(candidate.as_bytes(), &salt, &self.kdf)?;
        let reference_key = kdf::derive(reference.expose_secret().as_bytes(), &salt, &self.kdf)?;

        Ok(ring::constant_time::verify_slices_are_equal(
            candidate_key.as_ref(),
            reference_key.as_ref(),
        )
        .is_ok())
    }

    /// Encrypt a passphrase (or any payload) into a base64 envelope.
    pub async fn encrypt(&self, plaintext: &[u8]) -> Result<String, WebgpgError> {
        let key = self.master_key().await?;
        crypto::seal(&key, plaintext)
    }

    /// Decrypt a base64 envelope produced by [`Vault::encrypt`].
    pub async fn decrypt(&self, envelope: &str) -> Result<Vec<u8>, WebgpgError> {
        let key = self.master_key().await?;
        crypto::open(&key, envelope)
    }

    /// Issue a signed session token for the current time.
    pub async fn issue_token(&self) -> Result<String, WebgpgError> {
        let key = self.master_key().await?;
        let token = token::issue(&key, Utc::now().timestamp());
        debug!("session token issued");
        Ok(token)
    }

    /// Validate a presented session token.
    ///
    /// This gates every request, so it degrades safely: any failure,
    /// including inability to derive the master key, yields `false`.
    pub async fn verify_token(&self, token: &str, max_age_seconds: i64) -> bool {
        match self.master_key().await {
            Ok(key) => token::verify(&key, token, max_age_seconds, Utc::now().timestamp()),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use tempfile::tempdir;

    fn test_kdf() -> KdfConfig {
        // Low cost for fast tests.
        KdfConfig {
            iterations: 1,
            memory_kib: 8192,
            parallelism: 1,
        }
    }

    /// Vault over a file salt store pre-seeded with a fixed salt.
    fn fixed_salt_vault(dir: &tempfile::TempDir, password: Option<&str>) -> Vault {
        let path = dir.path().join("master_salt");
        std::fs::write(&path, format!("{}\n", BASE64.encode(*b"0123456789abcdef"))).unwrap();
        Vault::new(
            password.map(|p| SecretString::from(p.to_string())),
            test_kdf(),
            SaltStore::file(&path),
        )
    }

    #[tokio::test]
    async fn verify_accepts_correct_password_and_rejects_others() {
        let dir = tempdir().unwrap();
        let vault = fixed_salt_vault(&dir, Some("s3cret"));

        assert!(vault.verify_master_password("s3cret").await.unwrap());
        assert!(!vault.verify_master_password("wrong").await.unwrap());
        assert!(!vault.verify_master_password("").await.unwrap());
        assert!(!vault.verify_master_password("s3cret ").await.unwrap());
    }

    #[tokio::test]
    async fn verify_without_configured_password_is_a_config_error() {
        let dir = tempdir().unwrap();
        let vault = fixed_salt_vault(&dir, None);

        let result = vault.verify_master_password("anything").await;
        assert!(matches!(result, Err(WebgpgError::Config(_))));
    }

    #[tokio::test]
    async fn empty_configured_password_counts_as_unconfigured() {
        let dir = tempdir().unwrap();
        let vault = fixed_salt_vault(&dir, Some(""));

        assert!(!vault.is_configured());
        let result = vault.verify_master_password("").await;
        assert!(matches!(result, Err(WebgpgError::Config(_))));
    }

    #[tokio::test]
    async fn encrypt_decrypt_roundtrip() {
        let dir = tempdir().unwrap();
        let vault = fixed_salt_vault(&dir, Some("s3cret"));

        let envelope = vault.encrypt(b"key passphrase").await.unwrap();
        assert_eq!(vault.decrypt(&envelope).await.unwrap(), b"key passphrase");
    }

    #[tokio::test]
    async fn encrypting_twice_yields_distinct_envelopes() {
        let dir = tempdir().unwrap();
        let vault = fixed_salt_vault(&dir, Some("s3cret"));

        let env1 = vault.encrypt(b"hello").await.unwrap();
        let env2 = vault.encrypt(b"hello").await.unwrap();

        assert_ne!(env1, env2);
        assert_eq!(vault.decrypt(&env1).await.unwrap(), b"hello");
        assert_eq!(vault.decrypt(&env2).await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn decrypt_under_a_different_password_fails_authentication() {
        let dir = tempdir().unwrap();
        let vault = fixed_salt_vault(&dir, Some("s3cret"));
        let envelope = vault.encrypt(b"secret").await.unwrap();

        let other = fixed_salt_vault(&dir, Some("other-password"));
        let result = other.decrypt(&envelope).await;
        assert!(matches!(result, Err(WebgpgError::Authentication)));
    }

    #[tokio::test]
    async fn encrypt_without_configured_password_is_a_config_error() {
        let dir = tempdir().unwrap();
        let vault = fixed_salt_vault(&dir, None);

        let result = vault.encrypt(b"data").await;
        assert!(matches!(result, Err(WebgpgError::Config(_))));
    }

    #[tokio::test]
    async fn issued_token_verifies_and_garbage_does_not() {
        let dir = tempdir().unwrap();
        let vault = fixed_salt_vault(&dir, Some("s3cret"));

        let token = vault.issue_token().await.unwrap();
        assert!(vault.verify_token(&token, 86400).await);
        assert!(!vault.verify_token("not-a-token", 86400).await);
        assert!(!vault.verify_token("", 86400).await);
    }

    #[tokio::test]
    async fn verify_token_without_configured_password_is_false_not_error() {
        let dir = tempdir().unwrap();
        let configured = fixed_salt_vault(&dir, Some("s3cret"));
        let token = configured.issue_token().await.unwrap();

        let unconfigured = fixed_salt_vault(&dir, None);
        assert!(!unconfigured.verify_token(&token, 86400).await);
    }

    #[tokio::test]
    async fn token_survives_restart_with_same_password_and_salt() {
        let dir = tempdir().unwrap();
        let token = fixed_salt_vault(&dir, Some("s3cret"))
            .issue_token()
            .await
            .unwrap();

        // A fresh vault instance (same config, same salt) still accepts it.
        let vault = fixed_salt_vault(&dir, Some("s3cret"));
        assert!(vault.verify_token(&token, 86400).await);
    }

    #[tokio::test]
    async fn token_from_a_different_password_is_rejected() {
        let dir = tempdir().unwrap();
        let token = fixed_salt_vault(&dir, Some("other"))
            .issue_token()
            .await
            .unwrap();

        let vault = fixed_salt_vault(&dir, Some("s3cret"));
        assert!(!vault.verify_token(&token, 86400).await);
    }

    #[tokio::test]
    async fn debug_output_redacts_master_password() {
        let dir = tempdir().unwrap();
        let vault = fixed_salt_vault(&dir, Some("s3cret"));

        let debug_output = format!("{vault:?}");
        assert!(!debug_output.contains("s3cret"));
        assert!(debug_output.contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn vault_over_database_salt_store_roundtrips() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = webgpg_storage::Database::open(db_path.to_str().unwrap())
            .await
            .unwrap();

        let vault = Vault::new(
            Some(SecretString::from("s3cret".to_string())),
            test_kdf(),
            SaltStore::database(db.connection().clone()),
        );

        let envelope = vault.encrypt(b"hello").await.unwrap();
        assert_eq!(vault.decrypt(&envelope).await.unwrap(), b"hello");
        assert!(vault.verify_master_password("s3cret").await.unwrap());
    }
}
