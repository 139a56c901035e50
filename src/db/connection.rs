use std::fs;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use directories::BaseDirs;
use tracing::debug;

use super::error::{Error, Result};

/// Folder name used beneath the user's home directory for application data.
pub(crate) const DATA_DIR_NAME: &str = ".data-collection";
/// SQLite file name stored inside the application data directory.
pub(crate) const DB_FILE_NAME: &str = "entries.sqlite";

/// Idempotent schema: reopening an existing file never touches stored rows.
/// `AUTOINCREMENT` keeps SQLite from handing out the id of a deleted row again.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS entries (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    name                TEXT NOT NULL,
    address             TEXT NOT NULL,
    phone               TEXT NOT NULL,
    email               TEXT,
    emergency_contact_1 TEXT,
    emergency_contact_2 TEXT,
    date_of_birth       TEXT,
    id_type             TEXT,
    id_number           TEXT,
    id_expiry           TEXT,
    result              TEXT NOT NULL
);
";

/// Entry store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted and all calls
/// run on `tokio_rusqlite`'s connection thread.
#[derive(Clone)]
pub struct SqliteEntryStore {
    pub(super) conn: tokio_rusqlite::Connection,
}

impl SqliteEntryStore {
    /// Open (creating if absent) the database at `path` and make sure the
    /// `entries` table exists. The parent directory is created on demand.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| Error::DataDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let label = path.display().to_string();
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|source| Error::Unavailable {
                path: label.clone(),
                source,
            })?;
        Self::with_schema(conn, label).await
    }

    /// Open a throwaway database that lives as long as the store.
    pub async fn open_in_memory() -> Result<Self> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|source| Error::Unavailable {
                path: ":memory:".to_string(),
                source,
            })?;
        Self::with_schema(conn, ":memory:".to_string()).await
    }

    async fn with_schema(conn: tokio_rusqlite::Connection, label: String) -> Result<Self> {
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await
        .map_err(|source| Error::Unavailable {
            path: label.clone(),
            source,
        })?;

        debug!(path = %label, "entries table ready");
        Ok(Self { conn })
    }
}

/// Directory holding the database and the log file.
pub(crate) fn data_dir() -> anyhow::Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}
