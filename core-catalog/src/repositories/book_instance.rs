//! Book copy repository trait and implementation
//!
//! Copies are listed by due date, oldest first, with undated copies ahead of
//! every dated one (SQLite sorts NULL first in ascending order, matching
//! [`BookInstance::listing_cmp`]). Ties are broken by copy id.

use crate::error::{LibraryError, Result};
use crate::models::{BookInstance, BookInstanceDetail, LoanStatus};
use crate::repositories::{Page, PageRequest};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{query, query_as, SqlitePool};
use tracing::{debug, info};

const DETAIL_SELECT: &str = r#"
    SELECT bi.*, b.title AS book_title
    FROM book_instances bi
    LEFT JOIN books b ON b.id = bi.book_id
"#;

const LISTING_ORDER: &str = "ORDER BY bi.due_back ASC, bi.id ASC";

/// Book copy repository interface for data access operations
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait BookInstanceRepository: Send + Sync {
    /// Find a copy by its ID
    async fn find_by_id(&self, id: &str) -> Result<Option<BookInstance>>;

    /// Find a copy together with its book's title
    async fn find_detail(&self, id: &str) -> Result<Option<BookInstanceDetail>>;

    /// Insert a new copy
    ///
    /// # Errors
    /// Returns error if validation fails, the ID is taken, or a referenced
    /// book, borrower or language does not exist
    async fn insert(&self, instance: &BookInstance) -> Result<()>;

    /// Overwrite every field of an existing copy except its ID.
    ///
    /// No status transition rules are applied.
    ///
    /// # Errors
    /// Returns `NotFound` if no copy has this ID
    async fn update(&self, instance: &BookInstance) -> Result<()>;

    /// Delete a copy
    async fn delete(&self, id: &str) -> Result<bool>;

    /// List all copies in due-date order
    async fn query(&self, page_request: PageRequest) -> Result<Page<BookInstance>>;

    /// List the copies of one book in due-date order
    async fn query_by_book(
        &self,
        book_id: &str,
        page_request: PageRequest,
    ) -> Result<Page<BookInstance>>;

    /// Copies currently on loan, in due-date order
    async fn list_on_loan(&self, page_request: PageRequest)
        -> Result<Page<BookInstanceDetail>>;

    /// Copies on loan to one borrower, in due-date order
    async fn list_on_loan_by_borrower(
        &self,
        borrower_id: &str,
        page_request: PageRequest,
    ) -> Result<Page<BookInstanceDetail>>;

    /// Copies whose due date is strictly before `today`, regardless of status
    async fn find_overdue(&self, today: NaiveDate) -> Result<Vec<BookInstanceDetail>>;

    /// Number of copies with the given status
    async fn count_by_status(&self, status: LoanStatus) -> Result<i64>;

    /// Number of available copies of one book
    async fn count_available_for_book(&self, book_id: &str) -> Result<i64>;

    /// Count all copies
    async fn count(&self) -> Result<i64>;
}

/// SQLite implementation of BookInstanceRepository
pub struct SqliteBookInstanceRepository {
    pool: SqlitePool,
}

impl SqliteBookInstanceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn on_loan_page(
        &self,
        borrower_id: Option<&str>,
        page_request: PageRequest,
    ) -> Result<Page<BookInstanceDetail>> {
        let (total,): (i64,) = query_as(
            r#"
            SELECT COUNT(*) FROM book_instances
            WHERE status = ? AND (? IS NULL OR borrower_id = ?)
            "#,
        )
        .bind(LoanStatus::OnLoan)
        .bind(borrower_id)
        .bind(borrower_id)
        .fetch_one(&self.pool)
        .await?;

        let sql = format!(
            "{} WHERE bi.status = ? AND (? IS NULL OR bi.borrower_id = ?) {} LIMIT ? OFFSET ?",
            DETAIL_SELECT, LISTING_ORDER
        );
        let copies = query_as::<_, BookInstanceDetail>(&sql)
            .bind(LoanStatus::OnLoan)
            .bind(borrower_id)
            .bind(borrower_id)
            .bind(page_request.limit())
            .bind(page_request.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(copies, total as u64, page_request))
    }
}

#[async_trait]
impl BookInstanceRepository for SqliteBookInstanceRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<BookInstance>> {
        let instance = query_as::<_, BookInstance>("SELECT * FROM book_instances WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(instance)
    }

    async fn find_detail(&self, id: &str) -> Result<Option<BookInstanceDetail>> {
        let sql = format!("{} WHERE bi.id = ?", DETAIL_SELECT);
        let detail = query_as::<_, BookInstanceDetail>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(detail)
    }

    async fn insert(&self, instance: &BookInstance) -> Result<()> {
        instance
            .validate()
            .map_err(|e| LibraryError::invalid("BookInstance", e))?;

        query(
            r#"
            INSERT INTO book_instances (
                id, book_id, imprint, due_back, borrower_id, status, language_id
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(instance.id())
        .bind(&instance.book_id)
        .bind(&instance.imprint)
        .bind(instance.due_back)
        .bind(&instance.borrower_id)
        .bind(instance.status)
        .bind(&instance.language_id)
        .execute(&self.pool)
        .await?;

        debug!(
            instance_id = %instance.id(),
            status = %instance.status,
            "Inserted book copy"
        );
        Ok(())
    }

    async fn update(&self, instance: &BookInstance) -> Result<()> {
        instance
            .validate()
            .map_err(|e| LibraryError::invalid("BookInstance", e))?;

        let result = query(
            r#"
            UPDATE book_instances
            SET book_id = ?, imprint = ?, due_back = ?, borrower_id = ?,
                status = ?, language_id = ?
            WHERE id = ?
            "#,
        )
        .bind(&instance.book_id)
        .bind(&instance.imprint)
        .bind(instance.due_back)
        .bind(&instance.borrower_id)
        .bind(instance.status)
        .bind(&instance.language_id)
        .bind(instance.id())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(LibraryError::not_found("BookInstance", instance.id()));
        }

        debug!(
            instance_id = %instance.id(),
            status = %instance.status,
            due_back = ?instance.due_back,
            "Updated book copy"
        );
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = query("DELETE FROM book_instances WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(instance_id = %id, "Deleted book copy");
        }

        Ok(deleted)
    }

    async fn query(&self, page_request: PageRequest) -> Result<Page<BookInstance>> {
        let total = self.count().await?;

        let sql = format!(
            "SELECT bi.* FROM book_instances bi {} LIMIT ? OFFSET ?",
            LISTING_ORDER
        );
        let copies = query_as::<_, BookInstance>(&sql)
            .bind(page_request.limit())
            .bind(page_request.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(copies, total as u64, page_request))
    }

    async fn query_by_book(
        &self,
        book_id: &str,
        page_request: PageRequest,
    ) -> Result<Page<BookInstance>> {
        let (total,): (i64,) = query_as("SELECT COUNT(*) FROM book_instances WHERE book_id = ?")
            .bind(book_id)
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT bi.* FROM book_instances bi WHERE bi.book_id = ? {} LIMIT ? OFFSET ?",
            LISTING_ORDER
        );
        let copies = query_as::<_, BookInstance>(&sql)
            .bind(book_id)
            .bind(page_request.limit())
            .bind(page_request.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(copies, total as u64, page_request))
    }

    async fn list_on_loan(
        &self,
        page_request: PageRequest,
    ) -> Result<Page<BookInstanceDetail>> {
        self.on_loan_page(None, page_request).await
    }

    async fn list_on_loan_by_borrower(
        &self,
        borrower_id: &str,
        page_request: PageRequest,
    ) -> Result<Page<BookInstanceDetail>> {
        self.on_loan_page(Some(borrower_id), page_request).await
    }

    async fn find_overdue(&self, today: NaiveDate) -> Result<Vec<BookInstanceDetail>> {
        let sql = format!(
            "{} WHERE bi.due_back IS NOT NULL AND bi.due_back < ? {}",
            DETAIL_SELECT, LISTING_ORDER
        );
        let copies = query_as::<_, BookInstanceDetail>(&sql)
            .bind(today)
            .fetch_all(&self.pool)
            .await?;

        Ok(copies)
    }

    async fn count_by_status(&self, status: LoanStatus) -> Result<i64> {
        let (count,): (i64,) = query_as("SELECT COUNT(*) FROM book_instances WHERE status = ?")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn count_available_for_book(&self, book_id: &str) -> Result<i64> {
        let (count,): (i64,) = query_as(
            "SELECT COUNT(*) FROM book_instances WHERE book_id = ? AND status = ?",
        )
        .bind(book_id)
        .bind(LoanStatus::Available)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = query_as("SELECT COUNT(*) FROM book_instances")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
