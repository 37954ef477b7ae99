//! Genre repository trait and implementation

use crate::error::{LibraryError, Result};
use crate::models::Genre;
use crate::repositories::{Page, PageRequest};
use async_trait::async_trait;
use sqlx::{query, query_as, SqlitePool};
use tracing::{debug, info};

/// Genre repository interface for data access operations
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait GenreRepository: Send + Sync {
    /// Find a genre by its ID
    async fn find_by_id(&self, id: &str) -> Result<Option<Genre>>;

    /// Find a genre by name, ignoring ASCII case
    async fn find_by_name(&self, name: &str) -> Result<Option<Genre>>;

    /// Insert a new genre
    ///
    /// # Errors
    /// Returns error if validation fails or the ID is taken
    async fn insert(&self, genre: &Genre) -> Result<()>;

    /// Rename an existing genre
    ///
    /// # Errors
    /// Returns `NotFound` if no genre has this ID
    async fn update(&self, genre: &Genre) -> Result<()>;

    /// Delete a genre. Books lose the genre but are otherwise untouched.
    ///
    /// # Returns
    /// - `Ok(true)` if the genre was deleted
    /// - `Ok(false)` if it did not exist
    async fn delete(&self, id: &str) -> Result<bool>;

    /// List genres alphabetically
    async fn query(&self, page_request: PageRequest) -> Result<Page<Genre>>;

    /// Count all genres
    async fn count(&self) -> Result<i64>;
}

/// SQLite implementation of GenreRepository
pub struct SqliteGenreRepository {
    pool: SqlitePool,
}

impl SqliteGenreRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GenreRepository for SqliteGenreRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Genre>> {
        let genre = query_as::<_, Genre>("SELECT * FROM genres WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(genre)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Genre>> {
        let genre =
            query_as::<_, Genre>("SELECT * FROM genres WHERE name = ? COLLATE NOCASE LIMIT 1")
                .bind(name.trim())
                .fetch_optional(&self.pool)
                .await?;

        Ok(genre)
    }

    async fn insert(&self, genre: &Genre) -> Result<()> {
        genre
            .validate()
            .map_err(|e| LibraryError::invalid("Genre", e))?;

        query("INSERT INTO genres (id, name) VALUES (?, ?)")
            .bind(&genre.id)
            .bind(&genre.name)
            .execute(&self.pool)
            .await?;

        debug!(genre_id = %genre.id, name = %genre.name, "Inserted genre");
        Ok(())
    }

    async fn update(&self, genre: &Genre) -> Result<()> {
        genre
            .validate()
            .map_err(|e| LibraryError::invalid("Genre", e))?;

        let result = query("UPDATE genres SET name = ? WHERE id = ?")
            .bind(&genre.name)
            .bind(&genre.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(LibraryError::not_found("Genre", genre.id.as_str()));
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = query("DELETE FROM genres WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(genre_id = %id, "Deleted genre");
        }

        Ok(deleted)
    }

    async fn query(&self, page_request: PageRequest) -> Result<Page<Genre>> {
        let total = self.count().await?;

        let genres =
            query_as::<_, Genre>("SELECT * FROM genres ORDER BY name ASC, id ASC LIMIT ? OFFSET ?")
                .bind(page_request.limit())
                .bind(page_request.offset())
                .fetch_all(&self.pool)
                .await?;

        Ok(Page::new(genres, total as u64, page_request))
    }

    async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = query_as("SELECT COUNT(*) FROM genres")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
