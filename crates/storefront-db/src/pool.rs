//! # Database Handle
//!
//! Opens the store database and hands out one repository per model.
//!
//! ```text
//! AdminConfig ──► DbConfig::new(database_path)
//!                     .max_connections(n)
//!                     .busy_timeout(t)
//!                          │
//!                          ▼
//!                 Database::new(config)
//!                   ├─ file created if missing, WAL, foreign keys ON
//!                   ├─ SqlitePool
//!                   └─ pending migrations applied
//!                          │
//!        ┌─────────────┬───┴─────────┬─────────────┐
//!        ▼             ▼             ▼             ▼
//!  collections()   products()   customers()    orders()
//! ```
//!
//! An in-memory database lives exactly as long as its connection, so
//! [`DbConfig::in_memory`] pools one connection that is never recycled.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::collection::CollectionRepository;
use crate::repository::customer::CustomerRepository;
use crate::repository::order::OrderRepository;
use crate::repository::product::ProductRepository;

/// Where the store data lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    Memory,
}

impl fmt::Display for DbLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbLocation::File(path) => write!(f, "{}", path.display()),
            DbLocation::Memory => f.write_str(":memory:"),
        }
    }
}

/// How to open the store database.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub location: DbLocation,

    /// Pool size of a file database
    pub max_connections: u32,

    /// How long a statement waits on a write lock held by another
    /// connection (a bulk action, an order save) before failing
    pub busy_timeout: Duration,
}

impl DbConfig {
    /// A database file, created on first open.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            location: DbLocation::File(path.into()),
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
        }
    }

    /// A private, empty database; used by tests and the router test helpers.
    pub fn in_memory() -> Self {
        DbConfig {
            location: DbLocation::Memory,
            max_connections: 1,
            busy_timeout: Duration::from_secs(5),
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = match &self.location {
            DbLocation::File(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal),
            DbLocation::Memory => {
                SqliteConnectOptions::from_str("sqlite::memory:").map_err(|e| self.open_error(e))?
            }
        };

        // Protected deletes and the items cascade rely on enforced keys
        Ok(options.foreign_keys(true).busy_timeout(self.busy_timeout))
    }

    fn pool_options(&self) -> SqlitePoolOptions {
        match self.location {
            DbLocation::File(_) => SqlitePoolOptions::new().max_connections(self.max_connections),
            DbLocation::Memory => SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None),
        }
    }

    fn open_error(&self, err: impl fmt::Display) -> DbError {
        DbError::Open {
            location: self.location.to_string(),
            reason: err.to_string(),
        }
    }
}

/// The store database: a SQLite pool plus repository accessors.
///
/// Cheap to clone; every handler asks for the repository it needs:
/// ```rust,ignore
/// let page = state.db.collections().list(&query).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the database and brings its schema up to date.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        let pool = config
            .pool_options()
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| config.open_error(e))?;

        migrations::run_migrations(&pool).await?;

        info!(
            location = %config.location,
            max_connections = pool.options().get_max_connections(),
            "Store database ready"
        );
        Ok(Database { pool })
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn collections(&self) -> CollectionRepository {
        CollectionRepository::new(self.pool.clone())
    }

    /// ```rust,ignore
    /// let cleared = db.products().clear_inventory(&ids).await?;
    /// ```
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self.pool.clone())
    }

    pub fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.pool.clone())
    }

    /// Waits for checked-out connections and closes the pool. Every
    /// repository call afterwards fails with [`DbError::Unavailable`].
    pub async fn close(&self) {
        info!("Closing store database");
        self.pool.close().await;
    }

    /// `true` while the database answers queries (`GET /health`).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
