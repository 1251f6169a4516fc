// SPDX-FileCopyrightText: 2026 Webgpg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted master salt: read-or-create against a database row or a file.
//!
//! The salt is 16 random bytes generated exactly once per deployment and
//! stored base64-encoded, either as the `secrets` row `name = 'master_salt'`
//! or as a single text file. Regenerating it would silently invalidate every
//! stored envelope and every outstanding session token, so both backends use
//! an atomic insert-if-absent primitive and losers of the creation race
//! adopt the winner's salt. Within the process, population is single-flight
//! through a `OnceCell`.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rusqlite::params;
use tokio::sync::OnceCell;
use tracing::info;
use webgpg_core::WebgpgError;

use crate::kdf::{self, SALT_LEN};

/// Name of the secrets-table row holding the salt.
const SALT_SECRET_NAME: &str = "master_salt";

/// Read-through accessor for the persisted master salt.
pub struct SaltStore {
    backend: Backend,
    cache: OnceCell<[u8; SALT_LEN]>,
}

enum Backend {
    Database(tokio_rusqlite::Connection),
    File(PathBuf),
}

impl std::fmt::Debug for SaltStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let backend = match &self.backend {
            Backend::Database(_) => "database".to_string(),
            Backend::File(path) => format!("file:{}", path.display()),
        };
        f.debug_struct("SaltStore").field("backend", &backend).finish()
    }
}

impl SaltStore {
    /// Store the salt as a row in the `secrets` table of `conn`.
    pub fn database(conn: tokio_rusqlite::Connection) -> Self {
        Self {
            backend: Backend::Database(conn),
            cache: OnceCell::new(),
        }
    }

    /// Store the salt as a base64 text file at `path`.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: Backend::File(path.into()),
            cache: OnceCell::new(),
        }
    }

    /// Return the persisted salt, generating and persisting it on first use.
    pub async fn get_or_create(&self) -> Result<[u8; SALT_LEN], WebgpgError> {
        let salt = self
            .cache
            .get_or_try_init(|| async {
                match &self.backend {
                    Backend::Database(conn) => load_or_create_db(conn).await,
                    Backend::File(path) => load_or_create_file(path),
                }
            })
            .await?;
        Ok(*salt)
    }
}

async fn load_or_create_db(
    conn: &tokio_rusqlite::Connection,
) -> Result<[u8; SALT_LEN], WebgpgError> {
    if let Some(value) = select_salt(conn).await? {
        return decode_salt(&value);
    }

    let salt = kdf::generate_salt()?;
    let encoded = BASE64.encode(salt);
    let inserted = conn
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "INSERT OR IGNORE INTO secrets (name, value) VALUES (?1, ?2)",
                params![SALT_SECRET_NAME, encoded],
            )
        })
        .await
        .map_err(map_tr_err)?;

    if inserted == 1 {
        info!("generated master salt and stored in database (secrets.master_salt); keep database backups");
    }

    // Re-read rather than trusting our own bytes: a concurrent cold-start
    // writer may have won the insert race.
    let value = select_salt(conn).await?.ok_or_else(|| WebgpgError::Storage {
        source: "salt row missing after insert".into(),
    })?;
    decode_salt(&value)
}

async fn select_salt(conn: &tokio_rusqlite::Connection) -> Result<Option<String>, WebgpgError> {
    conn.call(|conn| -> Result<Option<String>, rusqlite::Error> {
        let result = conn.query_row(
            "SELECT value FROM secrets WHERE name = ?1",
            params![SALT_SECRET_NAME],
            |row| row.get(0),
        );
        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    })
    .await
    .map_err(map_tr_err)
}

fn load_or_create_file(path: &Path) -> Result<[u8; SALT_LEN], WebgpgError> {
    match fs::read_to_string(path) {
        Ok(contents) => return decode_salt(&contents),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(storage(e)),
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_restricted(parent)?;
    }

    let salt = kdf::generate_salt()?;
    let encoded = BASE64.encode(salt);

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    match options.open(path) {
        Ok(mut file) => {
            file.write_all(encoded.as_bytes())
                .and_then(|_| file.write_all(b"\n"))
                .map_err(storage)?;
            info!(path = %path.display(), "generated master salt; keep this file safe");
            Ok(salt)
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            // Lost the exclusive-creation race; adopt the winner's salt.
            let contents = fs::read_to_string(path).map_err(storage)?;
            decode_salt(&contents)
        }
        Err(e) => Err(storage(e)),
    }
}

fn create_dir_restricted(dir: &Path) -> Result<(), WebgpgError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        fs::DirBuilder::new()
            .recursive(true)
            .mode(0o700)
            .create(dir)
            .map_err(storage)
    }
    #[cfg(not(unix))]
    {
        fs::create_dir_all(dir).map_err(storage)
    }
}

fn decode_salt(value: &str) -> Result<[u8; SALT_LEN], WebgpgError> {
    let bytes = BASE64.decode(value.trim()).map_err(|e| WebgpgError::Storage {
        source: format!("persisted salt is not valid base64: {e}").into(),
    })?;
    bytes.try_into().map_err(|_| WebgpgError::Storage {
        source: format!("corrupted salt (expected {SALT_LEN} bytes)").into(),
    })
}

fn storage(e: io::Error) -> WebgpgError {
    WebgpgError::Storage { source: Box::new(e) }
}

/// Convert tokio-rusqlite errors to WebgpgError::Storage.
fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> WebgpgError {
    WebgpgError::Storage { source: Box::new(e) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[tokio::test]
    async fn file_backend_creates_then_returns_stable_salt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("master_salt");

        let store = SaltStore::file(&path);
        let salt1 = store.get_or_create().await.unwrap();
        let salt2 = store.get_or_create().await.unwrap();
        assert_eq!(salt1, salt2);

        // A second store over the same file sees the same salt.
        let other = SaltStore::file(&path);
        assert_eq!(other.get_or_create().await.unwrap(), salt1);
    }

    #[tokio::test]
    async fn file_backend_reads_preseeded_salt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("master_salt");
        let fixed = *b"0123456789abcdef";
        fs::write(&path, format!("{}\n", BASE64.encode(fixed))).unwrap();

        let store = SaltStore::file(&path);
        assert_eq!(store.get_or_create().await.unwrap(), fixed);
    }

    #[tokio::test]
    async fn file_backend_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data/master_salt");

        let store = SaltStore::file(&path);
        store.get_or_create().await.unwrap();
        assert!(path.is_file());
    }

    #[tokio::test]
    async fn file_payload_is_base64_with_trailing_newline() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("master_salt");

        let store = SaltStore::file(&path);
        let salt = store.get_or_create().await.unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.ends_with('\n'));
        assert_eq!(BASE64.decode(contents.trim()).unwrap(), salt);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn salt_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("master_salt");
        SaltStore::file(&path).get_or_create().await.unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn corrupted_file_salt_is_a_storage_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("master_salt");
        fs::write(&path, "@@not-base64@@\n").unwrap();

        let result = SaltStore::file(&path).get_or_create().await;
        assert!(matches!(result, Err(WebgpgError::Storage { .. })));
    }

    #[tokio::test]
    async fn wrong_length_file_salt_is_a_storage_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("master_salt");
        fs::write(&path, format!("{}\n", BASE64.encode(b"short"))).unwrap();

        let result = SaltStore::file(&path).get_or_create().await;
        assert!(matches!(result, Err(WebgpgError::Storage { .. })));
    }

    #[tokio::test]
    async fn concurrent_first_readers_share_one_salt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("master_salt");
        let store = Arc::new(SaltStore::file(&path));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.get_or_create().await.unwrap()
            }));
        }

        let first = handles.pop().unwrap().await.unwrap();
        for handle in handles {
            assert_eq!(handle.await.unwrap(), first);
        }
    }

    #[tokio::test]
    async fn database_backend_creates_then_returns_stable_salt() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = webgpg_storage::Database::open(db_path.to_str().unwrap())
            .await
            .unwrap();

        let store = SaltStore::database(db.connection().clone());
        let salt1 = store.get_or_create().await.unwrap();

        // A fresh store over the same connection reads the persisted row.
        let store2 = SaltStore::database(db.connection().clone());
        assert_eq!(store2.get_or_create().await.unwrap(), salt1);

        // The row is base64 of the returned bytes.
        let value: String = db
            .connection()
            .call(|conn| -> Result<String, rusqlite::Error> {
                conn.query_row(
                    "SELECT value FROM secrets WHERE name = 'master_salt'",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();
        assert_eq!(BASE64.decode(value.trim()).unwrap(), salt1);
    }

    #[tokio::test]
    async fn database_backend_keeps_exactly_one_salt_row() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = webgpg_storage::Database::open(db_path.to_str().unwrap())
            .await
            .unwrap();

        for _ in 0..3 {
            SaltStore::database(db.connection().clone())
                .get_or_create()
                .await
                .unwrap();
        }

        let count: i64 = db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row(
                    "SELECT COUNT(*) FROM secrets WHERE name = 'master_salt'",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
