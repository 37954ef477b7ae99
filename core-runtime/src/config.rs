//! # Core Configuration Module
//!
//! Configuration for the library catalog core.
//!
//! ## Overview
//!
//! A builder constructs a [`CoreConfig`] holding the database location, the
//! connection pool limits and, optionally, the logging setup to install.
//! `build()` validates everything up front so misconfiguration fails at
//! startup rather than on the first query.
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::CoreConfig;
//! use std::time::Duration;
//!
//! let config = CoreConfig::builder()
//!     .database_path("/var/lib/catalog/library.db")
//!     .max_connections(8)
//!     .acquire_timeout(Duration::from_secs(10))
//!     .build()
//!     .expect("valid configuration");
//!
//! assert_eq!(config.max_connections, 8);
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::CoreConfig;
//!
//! // Panics: no database path
//! CoreConfig::builder().build().expect("Should fail - missing database path");
//! ```

use crate::error::{Error, Result};
use crate::logging::LoggingConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Database path that selects a private in-memory database
pub const IN_MEMORY_DATABASE: &str = ":memory:";

/// Upper bound on pool size; SQLite serializes writers, so more buys nothing
pub const MAX_POOL_SIZE: u32 = 64;

const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Core configuration for the catalog.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// Path to the SQLite database file, or [`IN_MEMORY_DATABASE`]
    pub database_path: PathBuf,

    /// Connections kept open while idle
    pub min_connections: u32,

    /// Upper bound on open connections
    pub max_connections: u32,

    /// How long to wait for a free connection before failing
    pub acquire_timeout: Duration,

    /// Subscriber to install at bootstrap. `None` leaves logging to the host.
    pub logging: Option<LoggingConfig>,
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// True when the configuration selects an in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.database_path == Path::new(IN_MEMORY_DATABASE)
    }

    /// Validates the configuration.
    ///
    /// This checks:
    /// - Database path is not empty
    /// - Pool bounds are ordered and within [`MAX_POOL_SIZE`]
    /// - Acquire timeout is non-zero
    pub fn validate(&self) -> Result<()> {
        if self.database_path.as_os_str().is_empty() {
            return Err(Error::Config("Database path cannot be empty".to_string()));
        }

        if self.max_connections == 0 {
            return Err(Error::Config(
                "max_connections must be greater than 0".to_string(),
            ));
        }

        if self.max_connections > MAX_POOL_SIZE {
            return Err(Error::Config(format!(
                "max_connections is {}, maximum is {}",
                self.max_connections, MAX_POOL_SIZE
            )));
        }

        if self.min_connections > self.max_connections {
            return Err(Error::Config(format!(
                "min_connections ({}) exceeds max_connections ({})",
                self.min_connections, self.max_connections
            )));
        }

        if self.acquire_timeout.is_zero() {
            return Err(Error::Config(
                "acquire_timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for [`CoreConfig`].
#[derive(Debug, Default)]
pub struct CoreConfigBuilder {
    database_path: Option<PathBuf>,
    min_connections: Option<u32>,
    max_connections: Option<u32>,
    acquire_timeout: Option<Duration>,
    logging: Option<LoggingConfig>,
}

impl CoreConfigBuilder {
    /// Sets the database file path (required).
    pub fn database_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Uses a private in-memory database, mainly for tests and demos.
    pub fn in_memory(self) -> Self {
        self.database_path(IN_MEMORY_DATABASE)
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = Some(min);
        self
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = Some(max);
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = Some(timeout);
        self
    }

    /// Have bootstrap install this logging setup as the global subscriber.
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the database path is missing or any
    /// setting fails [`CoreConfig::validate`].
    pub fn build(self) -> Result<CoreConfig> {
        let database_path = self.database_path.ok_or_else(|| {
            Error::Config("Database path is required. Use .database_path() to set it.".to_string())
        })?;

        let config = CoreConfig {
            database_path,
            min_connections: self.min_connections.unwrap_or(DEFAULT_MIN_CONNECTIONS),
            max_connections: self.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS),
            acquire_timeout: self.acquire_timeout.unwrap_or(DEFAULT_ACQUIRE_TIMEOUT),
            logging: self.logging,
        };

        config.validate()?;

        Ok(config)
    }
}
