//! Language repository trait and implementation

use crate::error::{LibraryError, Result};
use crate::models::Language;
use crate::repositories::{Page, PageRequest};
use async_trait::async_trait;
use sqlx::{query, query_as, SqlitePool};
use tracing::{debug, info};

#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait LanguageRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Language>>;

    /// Find a language by name, ignoring ASCII case
    async fn find_by_name(&self, name: &str) -> Result<Option<Language>>;

    async fn insert(&self, language: &Language) -> Result<()>;

    /// # Errors
    /// Returns `NotFound` if no language has this ID
    async fn update(&self, language: &Language) -> Result<()>;

    /// Delete a language. Books and copies written in it survive with their
    /// language cleared.
    async fn delete(&self, id: &str) -> Result<bool>;

    async fn query(&self, page_request: PageRequest) -> Result<Page<Language>>;

    async fn count(&self) -> Result<i64>;
}

/// SQLite implementation of LanguageRepository
pub struct SqliteLanguageRepository {
    pool: SqlitePool,
}

impl SqliteLanguageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LanguageRepository for SqliteLanguageRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Language>> {
        let language = query_as::<_, Language>("SELECT * FROM languages WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(language)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Language>> {
        let language = query_as::<_, Language>(
            "SELECT * FROM languages WHERE name = ? COLLATE NOCASE LIMIT 1",
        )
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(language)
    }

    async fn insert(&self, language: &Language) -> Result<()> {
        language
            .validate()
            .map_err(|e| LibraryError::invalid("Language", e))?;

        query("INSERT INTO languages (id, name) VALUES (?, ?)")
            .bind(&language.id)
            .bind(&language.name)
            .execute(&self.pool)
            .await?;

        debug!(language_id = %language.id, name = %language.name, "Inserted language");
        Ok(())
    }

    async fn update(&self, language: &Language) -> Result<()> {
        language
            .validate()
            .map_err(|e| LibraryError::invalid("Language", e))?;

        let result = query("UPDATE languages SET name = ? WHERE id = ?")
            .bind(&language.name)
            .bind(&language.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(LibraryError::not_found("Language", language.id.as_str()));
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = query("DELETE FROM languages WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(language_id = %id, "Deleted language; referencing books and copies cleared");
        }

        Ok(deleted)
    }

    async fn query(&self, page_request: PageRequest) -> Result<Page<Language>> {
        let total = self.count().await?;

        let languages = query_as::<_, Language>(
            "SELECT * FROM languages ORDER BY name ASC, id ASC LIMIT ? OFFSET ?",
        )
        .bind(page_request.limit())
        .bind(page_request.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(languages, total as u64, page_request))
    }

    async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = query_as("SELECT COUNT(*) FROM languages")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
