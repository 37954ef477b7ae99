//! Workspace placeholder crate.
//!
//! Re-exports the catalog crates so a host application can depend on
//! `library-catalog-workspace` alone and reach the façade, the repositories
//! and the runtime configuration from one place. The `mocks` feature forwards
//! to `core-catalog/mocks` for hosts that test against generated repository
//! mocks.

pub use core_catalog as catalog;
pub use core_runtime as runtime;
pub use core_service as service;

pub use core_service::{CatalogService, CoreError};
