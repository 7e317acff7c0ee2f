//! SQLite-backed production store
//!
//! This module owns the single connection a run works through:
//! - Waits for the database to become reachable (bounded retries)
//! - Creates the MES schema and seeds reference data
//! - Writes lots, measurements and quality results inside manual
//!   transaction windows controlled by the caller
//! - Reports shift, equipment, defect and high-risk analytics

mod queries;
mod reports;
mod schema;
mod types;

pub use reports::{DEFAULT_HIGH_RISK_LIMIT, DEFAULT_RISK_THRESHOLD};
pub use types::*;

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use miette::Diagnostic;
use rusqlite::Connection;
use thiserror::Error;

/// Text format of every datetime column
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors raised by the production store
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("Database unavailable after {attempts} attempt(s): {}", path.display())]
    #[diagnostic(
        code(secom::store::unavailable),
        help("check that the database directory exists and is writable, or raise connect_attempts")
    )]
    Unavailable {
        path: PathBuf,
        attempts: u32,
        #[source]
        last_error: rusqlite::Error,
    },

    #[error("Database error: {0}")]
    #[diagnostic(code(secom::store::sqlite))]
    Sqlite(#[from] rusqlite::Error),
}

/// The production database backed by SQLite
pub struct ProductionStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl ProductionStore {
    /// Open a database file and verify it answers queries
    pub fn open(path: &Path, encoding: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        store.configure(encoding)?;
        Ok(store)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = Self {
            conn: Connection::open_in_memory()?,
            path: None,
        };
        store.configure("UTF-8")?;
        Ok(store)
    }

    /// Readiness loop: up to `attempts` tries, sleeping `backoff` between
    /// them. `on_retry` sees every failed attempt.
    pub fn connect_with_retry<F>(
        path: &Path,
        encoding: &str,
        attempts: u32,
        backoff: Duration,
        mut on_retry: F,
    ) -> Result<Self, StoreError>
    where
        F: FnMut(u32, u32, &rusqlite::Error),
    {
        let attempts = attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match Self::open(path, encoding) {
                Ok(store) => {
                    tracing::info!(path = %path.display(), attempt, "database connection established");
                    return Ok(store);
                }
                Err(StoreError::Sqlite(err)) => {
                    on_retry(attempt, attempts, &err);
                    if attempt >= attempts {
                        return Err(StoreError::Unavailable {
                            path: path.to_path_buf(),
                            attempts,
                            last_error: err,
                        });
                    }
                    thread::sleep(backoff);
                }
                Err(other) => return Err(other),
            }
        }
    }

    fn configure(&self, encoding: &str) -> Result<(), StoreError> {
        // Encoding only takes effect before the first table is created
        self.conn.execute_batch(&format!(
            "PRAGMA encoding = '{}'; PRAGMA foreign_keys = ON; PRAGMA journal_mode = WAL;",
            encoding.replace('\'', "''")
        ))?;
        self.conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    /// Database file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Start a transaction window
    pub fn begin(&self) -> Result<(), StoreError> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    /// Commit the open transaction window
    pub fn commit(&self) -> Result<(), StoreError> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT")?;
        }
        Ok(())
    }

    /// Discard everything written since the last commit
    pub fn rollback(&self) -> Result<(), StoreError> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }

    /// Whether a transaction window is open
    pub fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }
}
