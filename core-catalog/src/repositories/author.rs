//! Author repository trait and implementation

use crate::error::{LibraryError, Result};
use crate::models::{Author, Book};
use crate::repositories::{Page, PageRequest};
use async_trait::async_trait;
use sqlx::{query, query_as, SqlitePool};
use tracing::{debug, info};

/// Author repository interface for data access operations
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait AuthorRepository: Send + Sync {
    /// Find an author by its ID
    ///
    /// # Returns
    /// - `Ok(Some(author))` if found
    /// - `Ok(None)` if not found
    async fn find_by_id(&self, id: &str) -> Result<Option<Author>>;

    /// Insert a new author
    ///
    /// # Errors
    /// Returns error if validation fails or the ID is taken
    async fn insert(&self, author: &Author) -> Result<()>;

    /// Update an existing author
    ///
    /// # Errors
    /// Returns `NotFound` if no author has this ID
    async fn update(&self, author: &Author) -> Result<()>;

    /// Delete an author together with every book they wrote.
    ///
    /// Copies of those books are kept with their book reference cleared.
    ///
    /// # Returns
    /// - `Ok(true)` if the author was deleted
    /// - `Ok(false)` if it did not exist
    async fn delete(&self, id: &str) -> Result<bool>;

    /// List authors by `(last_name, first_name)`
    async fn query(&self, page_request: PageRequest) -> Result<Page<Author>>;

    /// Books written by the author, by title
    async fn find_books(&self, author_id: &str) -> Result<Vec<Book>>;

    /// Count all authors
    async fn count(&self) -> Result<i64>;
}

/// SQLite implementation of AuthorRepository
pub struct SqliteAuthorRepository {
    pool: SqlitePool,
}

impl SqliteAuthorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthorRepository for SqliteAuthorRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Author>> {
        let author = query_as::<_, Author>("SELECT * FROM authors WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(author)
    }

    async fn insert(&self, author: &Author) -> Result<()> {
        author
            .validate()
            .map_err(|e| LibraryError::invalid("Author", e))?;

        query(
            r#"
            INSERT INTO authors (
                id, first_name, last_name, full_name, date_of_birth, date_of_death
            )
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&author.id)
        .bind(&author.first_name)
        .bind(&author.last_name)
        .bind(&author.full_name)
        .bind(author.date_of_birth)
        .bind(author.date_of_death)
        .execute(&self.pool)
        .await?;

        debug!(author_id = %author.id, author = %author, "Inserted author");
        Ok(())
    }

    async fn update(&self, author: &Author) -> Result<()> {
        author
            .validate()
            .map_err(|e| LibraryError::invalid("Author", e))?;

        let result = query(
            r#"
            UPDATE authors
            SET first_name = ?, last_name = ?, full_name = ?,
                date_of_birth = ?, date_of_death = ?
            WHERE id = ?
            "#,
        )
        .bind(&author.first_name)
        .bind(&author.last_name)
        .bind(&author.full_name)
        .bind(author.date_of_birth)
        .bind(author.date_of_death)
        .bind(&author.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(LibraryError::not_found("Author", author.id.as_str()));
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        // Deleting the books explicitly (what ON DELETE CASCADE would do)
        // yields the count and takes the write lock before any read, so a
        // concurrent writer is waited out instead of failing with SQLITE_BUSY.
        let books_removed = query("DELETE FROM books WHERE author_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let result = query("DELETE FROM authors WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = result.rows_affected() > 0;
        if !deleted {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;

        info!(author_id = %id, books_removed, "Deleted author");

        Ok(deleted)
    }

    async fn query(&self, page_request: PageRequest) -> Result<Page<Author>> {
        let total = self.count().await?;

        let authors = query_as::<_, Author>(
            r#"
            SELECT * FROM authors
            ORDER BY last_name ASC, first_name ASC, id ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(page_request.limit())
        .bind(page_request.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(authors, total as u64, page_request))
    }

    async fn find_books(&self, author_id: &str) -> Result<Vec<Book>> {
        let books = query_as::<_, Book>(
            "SELECT * FROM books WHERE author_id = ? ORDER BY title ASC, id ASC",
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = query_as("SELECT COUNT(*) FROM authors")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
