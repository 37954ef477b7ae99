//! Borrower accounts referenced by book copies

use crate::error::{LibraryError, Result};
use crate::models::User;
use async_trait::async_trait;
use sqlx::{query, query_as, SqlitePool};
use tracing::info;

#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// # Errors
    /// Fails if validation fails or the username is taken
    async fn insert(&self, user: &User) -> Result<()>;

    /// Delete a user. Copies they hold keep their loan data but lose the
    /// borrower reference.
    async fn delete(&self, id: &str) -> Result<bool>;
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let user = query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn insert(&self, user: &User) -> Result<()> {
        user.validate()
            .map_err(|e| LibraryError::invalid("User", e))?;

        query("INSERT INTO users (id, username) VALUES (?, ?)")
            .bind(&user.id)
            .bind(&user.username)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(user_id = %id, "Deleted user; borrowed copies detached");
        }

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    #[tokio::test]
    async fn test_user_lifecycle() {
        let repo = SqliteUserRepository::new(create_test_pool().await.unwrap());

        let user = User::new("amelie");
        repo.insert(&user).await.unwrap();

        assert_eq!(repo.find_by_id(&user.id).await.unwrap(), Some(user.clone()));
        assert_eq!(
            repo.find_by_username("amelie").await.unwrap().map(|u| u.id),
            Some(user.id.clone())
        );

        assert!(repo.delete(&user.id).await.unwrap());
        assert!(repo.find_by_id(&user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let repo = SqliteUserRepository::new(create_test_pool().await.unwrap());

        repo.insert(&User::new("librarian")).await.unwrap();
        assert!(matches!(
            repo.insert(&User::new("librarian")).await,
            Err(LibraryError::Database(_))
        ));
        assert!(matches!(
            repo.insert(&User::new("")).await,
            Err(LibraryError::InvalidInput { .. })
        ));
    }
}
