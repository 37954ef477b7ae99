//! # Repository Pattern Implementation
//!
//! Repository traits and their SQLite implementations, one per catalog entity.
//!
//! ## Architecture
//!
//! - Traits define the interface for each repository
//! - SQLite implementations use sqlx for async database access
//! - All operations return `Result<T>` for error handling
//! - Listings are paginated via the `Page<T>` wrapper
//!
//! ## Available Repositories
//!
//! - `GenreRepository` - Genres, listed by name
//! - `LanguageRepository` - Languages, listed by name
//! - `AuthorRepository` - Authors, listed by last then first name
//! - `BookRepository` - Books and their genre links
//! - `BookInstanceRepository` - Lendable copies and loan queries
//! - `UserRepository` - Borrowers referenced by copies
//!
//! Referential actions on delete are enforced by the database; see
//! [`crate::schema::RELATIONSHIPS`].

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;
pub mod language;
pub mod pagination;
pub mod user;

pub use author::{AuthorRepository, SqliteAuthorRepository};
pub use book::{BookRepository, SqliteBookRepository};
pub use book_instance::{BookInstanceRepository, SqliteBookInstanceRepository};
pub use genre::{GenreRepository, SqliteGenreRepository};
pub use language::{LanguageRepository, SqliteLanguageRepository};
pub use pagination::{Page, PageRequest, MAX_PAGE_SIZE};
pub use user::{SqliteUserRepository, UserRepository};

#[cfg(any(test, feature = "mocks"))]
pub use author::MockAuthorRepository;
#[cfg(any(test, feature = "mocks"))]
pub use book::MockBookRepository;
#[cfg(any(test, feature = "mocks"))]
pub use book_instance::MockBookInstanceRepository;
#[cfg(any(test, feature = "mocks"))]
pub use genre::MockGenreRepository;
#[cfg(any(test, feature = "mocks"))]
pub use language::MockLanguageRepository;
#[cfg(any(test, feature = "mocks"))]
pub use user::MockUserRepository;
