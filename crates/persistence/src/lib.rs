// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for ODN Flow.
//!
//! Facilities, processes, ODNs, route assignments, resources and the audit
//! trail are stored in `SQLite` through Diesel. Schema changes are embedded
//! migrations applied when a connection is opened.
//!
//! ## Transactions
//!
//! Every workflow mutation follows the same shape: load the `State`, apply
//! a command with the pure core, write the resulting changes and append
//! the audit event. [`Persistence::atomically`] runs that sequence inside a
//! single `BEGIN IMMEDIATE` transaction so that the write lock is held from
//! the first read. If the operation returns an error the transaction is
//! rolled back.
//!
//! Process and ODN rows carry a `version` column. Updates and deletes only
//! match the version the command was computed from; a write that matches
//! no row fails with [`PersistenceError::StaleWrite`].

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::{Connection, SqliteConnection};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod transaction;

#[cfg(test)]
mod tests;

pub use error::PersistenceError;
pub use mutations::PersistedTransition;
pub use transaction::WorkflowTransaction;

use backend::PersistenceBackend;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Type alias kept for callers that name the backend explicitly.
pub type SqlitePersistence = Persistence;

/// Wraps the error of a transactional operation so that Diesel's own
/// failures (`BEGIN`, `COMMIT`) can travel alongside it.
enum TransactionAbort<E> {
    Database(diesel::result::Error),
    Operation(E),
}

impl<E> From<diesel::result::Error> for TransactionAbort<E> {
    fn from(err: diesel::result::Error) -> Self {
        Self::Database(err)
    }
}

impl<E: From<PersistenceError>> TransactionAbort<E> {
    fn into_error(self) -> E {
        match self {
            Self::Database(err) => E::from(PersistenceError::from(err)),
            Self::Operation(err) => err,
        }
    }
}

/// Persistence adapter over a single `SQLite` connection.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique shared in-memory database, so tests are
    /// isolated from each other.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String =
            format!("file:memdb_odn_flow_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        self.conn.verify_foreign_key_enforcement()
    }

    /// Runs `operation` inside one `IMMEDIATE` transaction.
    ///
    /// The transaction commits if `operation` returns `Ok` and rolls back
    /// otherwise. Errors raised by the operation are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns the operation's error, or a `PersistenceError` converted into
    /// `E` if the transaction cannot be started or committed.
    pub fn atomically<T, E, F>(&mut self, operation: F) -> Result<T, E>
    where
        E: From<PersistenceError>,
        F: FnOnce(&mut WorkflowTransaction<'_>) -> Result<T, E>,
    {
        self.conn
            .immediate_transaction::<T, TransactionAbort<E>, _>(|conn| {
                let mut tx: WorkflowTransaction<'_> = WorkflowTransaction { conn };
                operation(&mut tx).map_err(TransactionAbort::Operation)
            })
            .map_err(|abort| {
                if let TransactionAbort::Database(err) = &abort {
                    warn!(error = %err, "Transaction aborted by the database");
                }
                abort.into_error()
            })
    }

    /// Runs read-only `operation` inside one deferred transaction so that
    /// every query sees the same snapshot.
    ///
    /// # Errors
    ///
    /// Returns the operation's error, or a `PersistenceError` converted into
    /// `E` if the transaction cannot be started.
    pub fn read<T, E, F>(&mut self, operation: F) -> Result<T, E>
    where
        E: From<PersistenceError>,
        F: FnOnce(&mut WorkflowTransaction<'_>) -> Result<T, E>,
    {
        self.conn
            .transaction::<T, TransactionAbort<E>, _>(|conn| {
                let mut tx: WorkflowTransaction<'_> = WorkflowTransaction { conn };
                operation(&mut tx).map_err(TransactionAbort::Operation)
            })
            .map_err(TransactionAbort::into_error)
    }
}
