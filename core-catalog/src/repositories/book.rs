//! Book repository trait and implementation
//!
//! Besides the usual CRUD operations this repository owns the `book_genres`
//! link table. Genre names come back in the order they were linked, but that
//! order is an implementation detail callers should not depend on.

use crate::error::{LibraryError, Result};
use crate::models::Book;
use crate::repositories::{Page, PageRequest};
use async_trait::async_trait;
use sqlx::{query, query_as, SqlitePool};
use tracing::{debug, info};

/// Book repository interface for data access operations
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Find a book by its ID
    async fn find_by_id(&self, id: &str) -> Result<Option<Book>>;

    /// Insert a new book
    ///
    /// # Errors
    /// Returns error if:
    /// - Book validation fails
    /// - The referenced author or language does not exist
    /// - Database error occurs
    async fn insert(&self, book: &Book) -> Result<()>;

    /// Update an existing book
    ///
    /// # Errors
    /// Returns `NotFound` if no book has this ID
    async fn update(&self, book: &Book) -> Result<()>;

    /// Delete a book. Its copies are kept with their book reference cleared.
    ///
    /// # Returns
    /// - `Ok(true)` if the book was deleted
    /// - `Ok(false)` if it did not exist
    async fn delete(&self, id: &str) -> Result<bool>;

    /// List books by title
    async fn query(&self, page_request: PageRequest) -> Result<Page<Book>>;

    /// List one author's books by title
    async fn query_by_author(
        &self,
        author_id: &str,
        page_request: PageRequest,
    ) -> Result<Page<Book>>;

    /// Count all books
    async fn count(&self) -> Result<i64>;

    /// Replace the book's genres with `genre_ids`, in that order
    ///
    /// # Errors
    /// Returns `NotFound` if the book does not exist
    async fn set_genres(&self, book_id: &str, genre_ids: &[String]) -> Result<()>;

    /// Link one more genre to the book. Linking twice is a no-op.
    async fn add_genre(&self, book_id: &str, genre_id: &str) -> Result<()>;

    /// Unlink a genre from the book
    ///
    /// # Returns
    /// `Ok(true)` if the genre was linked
    async fn remove_genre(&self, book_id: &str, genre_id: &str) -> Result<bool>;

    /// Names of all genres linked to the book
    async fn genre_names(&self, book_id: &str) -> Result<Vec<String>>;

    /// At most three genre names, comma-joined
    async fn genre_summary(&self, book_id: &str) -> Result<String>;
}

/// SQLite implementation of BookRepository
pub struct SqliteBookRepository {
    pool: SqlitePool,
}

impl SqliteBookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn genre_names_limited(&self, book_id: &str, limit: i64) -> Result<Vec<String>> {
        let names = query_as::<_, (String,)>(
            r#"
            SELECT g.name FROM genres g
            INNER JOIN book_genres bg ON bg.genre_id = g.id
            WHERE bg.book_id = ?
            ORDER BY bg.rowid ASC
            LIMIT ?
            "#,
        )
        .bind(book_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|(name,)| name)
        .collect();

        Ok(names)
    }
}

#[async_trait]
impl BookRepository for SqliteBookRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Book>> {
        let book = query_as::<_, Book>("SELECT * FROM books WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(book)
    }

    async fn insert(&self, book: &Book) -> Result<()> {
        book.validate()
            .map_err(|e| LibraryError::invalid("Book", e))?;

        query(
            r#"
            INSERT INTO books (id, title, author_id, summary, isbn, language_id)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&book.id)
        .bind(&book.title)
        .bind(&book.author_id)
        .bind(&book.summary)
        .bind(&book.isbn)
        .bind(&book.language_id)
        .execute(&self.pool)
        .await?;

        debug!(book_id = %book.id, title = %book.title, "Inserted book");
        Ok(())
    }

    async fn update(&self, book: &Book) -> Result<()> {
        book.validate()
            .map_err(|e| LibraryError::invalid("Book", e))?;

        let result = query(
            r#"
            UPDATE books
            SET title = ?, author_id = ?, summary = ?, isbn = ?, language_id = ?
            WHERE id = ?
            "#,
        )
        .bind(&book.title)
        .bind(&book.author_id)
        .bind(&book.summary)
        .bind(&book.isbn)
        .bind(&book.language_id)
        .bind(&book.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(LibraryError::not_found("Book", book.id.as_str()));
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        // Write first: a deferred transaction that reads before writing
        // cannot wait out a concurrent writer and fails with SQLITE_BUSY.
        let copies = query("UPDATE book_instances SET book_id = NULL WHERE book_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let result = query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = result.rows_affected() > 0;
        if !deleted {
            // Nothing referenced a missing book, so the UPDATE touched no rows
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;

        info!(book_id = %id, copies_detached = copies, "Deleted book");

        Ok(deleted)
    }

    async fn query(&self, page_request: PageRequest) -> Result<Page<Book>> {
        let total = self.count().await?;

        let books = query_as::<_, Book>(
            "SELECT * FROM books ORDER BY title ASC, id ASC LIMIT ? OFFSET ?",
        )
        .bind(page_request.limit())
        .bind(page_request.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(books, total as u64, page_request))
    }

    async fn query_by_author(
        &self,
        author_id: &str,
        page_request: PageRequest,
    ) -> Result<Page<Book>> {
        let (total,): (i64,) = query_as("SELECT COUNT(*) FROM books WHERE author_id = ?")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await?;

        let books = query_as::<_, Book>(
            r#"
            SELECT * FROM books
            WHERE author_id = ?
            ORDER BY title ASC, id ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(author_id)
        .bind(page_request.limit())
        .bind(page_request.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(books, total as u64, page_request))
    }

    async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = query_as("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn set_genres(&self, book_id: &str, genre_ids: &[String]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // Clearing the links first takes the write lock before any read
        query("DELETE FROM book_genres WHERE book_id = ?")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        let exists: Option<(String,)> = query_as("SELECT id FROM books WHERE id = ?")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            tx.rollback().await?;
            return Err(LibraryError::not_found("Book", book_id));
        }

        for genre_id in genre_ids {
            query("INSERT OR IGNORE INTO book_genres (book_id, genre_id) VALUES (?, ?)")
                .bind(book_id)
                .bind(genre_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        debug!(book_id = %book_id, genres = genre_ids.len(), "Replaced book genres");
        Ok(())
    }

    async fn add_genre(&self, book_id: &str, genre_id: &str) -> Result<()> {
        query("INSERT OR IGNORE INTO book_genres (book_id, genre_id) VALUES (?, ?)")
            .bind(book_id)
            .bind(genre_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn remove_genre(&self, book_id: &str, genre_id: &str) -> Result<bool> {
        let result = query("DELETE FROM book_genres WHERE book_id = ? AND genre_id = ?")
            .bind(book_id)
            .bind(genre_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn genre_names(&self, book_id: &str) -> Result<Vec<String>> {
        self.genre_names_limited(book_id, -1).await
    }

    async fn genre_summary(&self, book_id: &str) -> Result<String> {
        let names = self
            .genre_names_limited(book_id, crate::models::GENRE_SUMMARY_LIMIT as i64)
            .await?;

        Ok(Book::display_genre(names))
    }
}
