//! Storage layer for incidentlog.
//!
//! This module provides `SQLite`-based persistence for incident records: a
//! single table with create, list, update, and delete operations. Each call
//! is one statement in its own implicit transaction.

pub mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::record::{self, NewRecord, Record};

use schema::{CREATE_RECORDS_TABLE, RECORDS_TABLE, RECORD_COLUMNS};

/// Storage engine for incident records.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist,
    /// then makes sure the records table is present.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the table cannot
    /// be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let storage = Self { path, conn };
        storage.create_table()?;

        info!("Database opened successfully at {}", storage.path.display());
        Ok(storage)
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        let storage = Self {
            path: PathBuf::from(":memory:"),
            conn,
        };
        storage.create_table()?;
        Ok(storage)
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the records table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaCreate`] if the statement fails.
    pub fn create_table(&self) -> Result<()> {
        match self.conn.execute(CREATE_RECORDS_TABLE, []) {
            Ok(_) => {
                debug!("Table {} ready", RECORDS_TABLE);
                Ok(())
            }
            Err(e) => {
                error!("Failed to create table {}: {}", RECORDS_TABLE, e);
                Err(Error::SchemaCreate(e))
            }
        }
    }

    /// Fetch every record in storage order.
    ///
    /// Rows whose `date` is NULL or not `YYYY-MM-DD` are logged and left out
    /// of the result; they stay in the table and can still be deleted by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list(&self) -> Result<Vec<Record>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM {RECORDS_TABLE} ORDER BY id"
        ))?;

        let mut records = Vec::new();
        for row in stmt.query_map([], Self::row_to_record)? {
            match row {
                Ok(record) => records.push(record),
                Err(
                    e @ (rusqlite::Error::FromSqlConversionFailure(..)
                    | rusqlite::Error::InvalidColumnType(..)),
                ) => warn!("Skipping unreadable record: {}", e),
                Err(e) => return Err(e.into()),
            }
        }

        Ok(records)
    }

    /// Get a record by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, id: i64) -> Result<Option<Record>> {
        let result = self
            .conn
            .query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM {RECORDS_TABLE} WHERE id = ?1"),
                [id],
                Self::row_to_record,
            )
            .optional()?;
        Ok(result)
    }

    /// Insert a record and return the id assigned to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert(&self, record: &NewRecord) -> Result<i64> {
        self.conn.execute(
            r"
            INSERT INTO Agentes (date, title, description, photo, audio)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
            params![
                record.date_text(),
                record.title,
                record.description,
                record.photo,
                record.audio,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        info!("Inserted record with id {}", id);
        Ok(id)
    }

    /// Replace all mutable fields of the record with the given id.
    ///
    /// Returns `true` if a record was updated, `false` if none matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn update(&self, id: i64, record: &NewRecord) -> Result<bool> {
        let affected = self.conn.execute(
            r"
            UPDATE Agentes
            SET date = ?1, title = ?2, description = ?3, photo = ?4, audio = ?5
            WHERE id = ?6
            ",
            params![
                record.date_text(),
                record.title,
                record.description,
                record.photo,
                record.audio,
                id,
            ],
        )?;

        if affected > 0 {
            info!("Updated record with id {}", id);
        } else {
            debug!("Update matched no record with id {}", id);
        }
        Ok(affected > 0)
    }

    /// Delete a record by ID.
    ///
    /// Returns `true` if a record was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM Agentes WHERE id = ?1", [id])?;
        if affected > 0 {
            info!("Deleted record with id {}", id);
        }
        Ok(affected > 0)
    }

    /// Delete every record.
    ///
    /// Returns the number of records deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_all(&self) -> Result<usize> {
        let affected = self.conn.execute("DELETE FROM Agentes", [])?;
        if affected > 0 {
            info!("Deleted all {} records", affected);
        }
        Ok(affected)
    }

    /// Count total records in storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM Agentes", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let total_records = self.count()?;

        let with_audio: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM Agentes WHERE audio IS NOT NULL AND audio != ''",
            [],
            |row| row.get(0),
        )?;

        let newest_date: Option<String> = self
            .conn
            .query_row(
                "SELECT date FROM Agentes ORDER BY date DESC LIMIT 1",
                [],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?
            .flatten();

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            total_records,
            with_audio,
            newest_date,
            db_size_bytes,
        })
    }

    /// Run a raw statement, for fixtures that bypass the typed API.
    #[cfg(test)]
    pub(crate) fn execute_raw(&self, sql: &str) -> Result<usize> {
        Ok(self.conn.execute(sql, [])?)
    }

    /// Convert a database row to a Record struct.
    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<Record> {
        let id: i64 = row.get(0)?;
        let date_str: Option<String> = row.get(1)?;
        let title: Option<String> = row.get(2)?;
        let description: Option<String> = row.get(3)?;
        let photo: Option<String> = row.get(4)?;
        let audio: Option<String> = row.get(5)?;

        let Some(date_str) = date_str else {
            return Err(rusqlite::Error::InvalidColumnType(
                1,
                format!("date (record {id})"),
                Type::Null,
            ));
        };
        let date = record::parse_date(&date_str)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;

        Ok(Record {
            id,
            date,
            title: title.unwrap_or_default(),
            description: description.unwrap_or_default(),
            photo,
            audio,
        })
    }
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StorageStats {
    /// Total number of records stored.
    pub total_records: i64,
    /// Records carrying an audio clip.
    pub with_audio: i64,
    /// Most recent incident date, as stored.
    pub newest_date: Option<String>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

/// A [`Storage`] shared between async flows.
///
/// Statements run on the blocking pool so a slow disk never stalls the
/// executor; each call resolves to an explicit `Result`.
#[derive(Debug, Clone)]
pub struct SharedStorage {
    inner: Arc<Mutex<Storage>>,
}

impl SharedStorage {
    /// Wrap an opened storage.
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self {
            inner: Arc::new(Mutex::new(storage)),
        }
    }

    /// Run `f` against the storage on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns, or an internal error if the lock is
    /// poisoned or the blocking task panicked.
    pub async fn run<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Storage) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let storage = inner
                .lock()
                .map_err(|e| Error::internal(format!("storage lock poisoned: {e}")))?;
            f(&storage)
        })
        .await
        .map_err(|e| Error::internal(format!("storage task failed: {e}")))?
    }
}
