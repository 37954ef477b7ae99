//! # Catalog Module
//!
//! Owns the library catalog database: books, their authors, genres and
//! languages, and the physical copies that patrons borrow.
//!
//! ## Overview
//!
//! This module manages:
//! - SQLite schema and migrations for the catalog entities
//! - Per-relationship deletion policies (cascade vs. clear-on-delete)
//! - Repository patterns for every entity, with pagination
//! - The loan state of each copy and its overdue check
//!
//! The current date is always passed in by the caller; nothing in this crate
//! reads the system clock to decide whether a copy is overdue.

pub mod db;
pub mod error;
pub mod models;
pub mod repositories;
pub mod schema;

pub use error::{LibraryError, Result};
pub use models::{
    Author, Book, BookInstance, BookInstanceDetail, Genre, Language, LoanStatus, User,
};
