//! # Core Runtime Module
//!
//! Runtime infrastructure shared by the library catalog crates:
//! - Logging and tracing setup
//! - Configuration with fail-fast validation
//!
//! ## Overview
//!
//! Nothing here touches the database. `core-service` reads a
//! [`config::CoreConfig`] and turns it into a connection pool; the catalog
//! crates only emit `tracing` events and leave subscriber setup to
//! [`logging::init_logging`].

pub mod config;
pub mod error;
pub mod logging;

pub use config::{CoreConfig, CoreConfigBuilder};
pub use error::{Error, Result};
pub use logging::{LogFormat, LogLevel, LoggingConfig};
