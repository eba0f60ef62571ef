//! SQLite-backed persistence for the job table and the rate-limit table.
//!
//! Both tables live in one database file; `acquire_slots` is the only
//! operation that needs an exclusive transaction, everything else is a plain
//! autocommit statement.

mod error;
mod job_store;
mod model;
mod rate_limit_store;

pub use error::Result;
pub use error::StoreError;
pub use model::JobPatch;

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::sqlite::SqliteJournalMode;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::sqlite::SqliteSynchronous;
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

#[derive(Clone)]
pub struct ControlPlaneStore {
    pool: SqlitePool,
}

impl ControlPlaneStore {
    /// Opens (and migrates) the database file at `path`, creating it if
    /// missing.
    pub async fn open(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5));
        Self::open_with(options, 5).await
    }

    /// In-memory database for tests: each connection in the pool would
    /// otherwise see its own private database, so the pool is pinned to a
    /// single connection.
    pub async fn open_in_memory() -> Result<Self> {
        let options: SqliteConnectOptions = "sqlite::memory:".parse()?;
        let options = options.create_if_missing(true);
        Self::open_with(options, 1).await
    }

    async fn open_with(options: SqliteConnectOptions, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        MIGRATOR.run(&pool).await?;
        Ok(Self { pool })
    }
}
