//! # Catalog Database Pool
//!
//! Opens the SQLite pool backing the catalog and brings its schema up to date.
//!
//! Every connection is opened with foreign keys enforced: the cascade and
//! clear-on-delete policies of the catalog (see [`crate::schema`]) are
//! implemented by SQLite itself and silently stop working without them.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_catalog::db::{create_pool, DatabaseConfig};
//!
//! let pool = create_pool(DatabaseConfig::new("library.db").max_connections(8)).await?;
//! ```
//!
//! Tests use a private in-memory database per pool:
//!
//! ```rust,ignore
//! let pool = create_test_pool().await?;
//! ```

use crate::{LibraryError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where the catalog database lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// A database file, created on first use. The path is taken verbatim,
    /// never parsed as a URL.
    File(PathBuf),
    /// A private database that lives as long as its pool
    InMemory,
}

impl fmt::Display for DatabaseLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseLocation::File(path) => write!(f, "{}", path.display()),
            DatabaseLocation::InMemory => f.write_str(":memory:"),
        }
    }
}

/// Connection pool settings for the catalog database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub location: DatabaseLocation,

    /// Connections kept open even when idle
    pub min_connections: u32,

    /// Upper bound on open connections
    pub max_connections: u32,

    /// How long a caller waits for a free connection
    pub acquire_timeout: Duration,

    /// Connections older than this are recycled
    pub max_lifetime: Option<Duration>,

    /// Idle connections above `min_connections` are closed after this
    pub idle_timeout: Option<Duration>,
}

impl DatabaseConfig {
    /// Configuration for a database file, created on first use
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            location: DatabaseLocation::File(database_path.into()),
            min_connections: 1,
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            max_lifetime: Some(Duration::from_secs(30 * 60)),
            idle_timeout: Some(Duration::from_secs(10 * 60)),
        }
    }

    /// Configuration for a throwaway in-memory database.
    ///
    /// Connections never expire so the database lives as long as the pool.
    pub fn in_memory() -> Self {
        Self {
            location: DatabaseLocation::InMemory,
            min_connections: 1,
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            max_lifetime: None,
            idle_timeout: None,
        }
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn max_lifetime(mut self, lifetime: Option<Duration>) -> Self {
        self.max_lifetime = lifetime;
        self
    }

    pub fn idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    fn connect_options(&self) -> Result<SqliteConnectOptions> {
        let base = match &self.location {
            DatabaseLocation::File(path) => SqliteConnectOptions::new().filename(path),
            // sqlx names each in-memory database uniquely with a shared cache,
            // so every connection of one pool sees the same data
            DatabaseLocation::InMemory => SqliteConnectOptions::from_str("sqlite::memory:")?,
        };

        let options = base
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .create_if_missing(true);

        Ok(options)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::in_memory()
    }
}

/// Open the pool, apply pending migrations and verify the connection.
pub async fn create_pool(config: DatabaseConfig) -> Result<SqlitePool> {
    info!(
        database = %config.location,
        min_connections = config.min_connections,
        max_connections = config.max_connections,
        "Opening catalog database"
    );

    let connect_options = config.connect_options()?;

    let pool = SqlitePoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .max_lifetime(config.max_lifetime)
        .idle_timeout(config.idle_timeout)
        .connect_with(connect_options)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to open catalog database");
            LibraryError::Database(e)
        })?;

    debug!(connections = pool.size(), "Catalog pool opened");

    run_migrations(&pool).await?;
    health_check(&pool).await?;

    info!("Catalog database ready");
    Ok(pool)
}

/// In-memory pool with the catalog schema applied
pub async fn create_test_pool() -> Result<SqlitePool> {
    create_pool(DatabaseConfig::in_memory()).await
}

/// Apply the embedded migrations from `migrations/`
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    debug!("Applying catalog migrations");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Catalog migration failed");
            LibraryError::Migration(e.to_string())
        })?;

    Ok(())
}

async fn health_check(pool: &SqlitePool) -> Result<()> {
    sqlx::query("SELECT 1").execute(pool).await.map_err(|e| {
        warn!(error = %e, "Catalog database health check failed");
        LibraryError::Database(e)
    })?;

    Ok(())
}
