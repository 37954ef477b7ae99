//! Core service façade and bootstrap helpers.
//!
//! [`CatalogService::bootstrap`] turns a validated [`CoreConfig`] into an open,
//! migrated catalog database and hands out its repositories behind trait
//! objects. Hosts that already own a pool, or tests that want mocks, build the
//! service from [`CatalogRepositories`] directly.
//!
//! ```no_run
//! # async fn example() -> core_service::Result<()> {
//! use core_runtime::CoreConfig;
//! use core_service::CatalogService;
//!
//! let config = CoreConfig::builder()
//!     .database_path("/var/lib/catalog/library.db")
//!     .build()?;
//! let catalog = CatalogService::bootstrap(config).await?;
//! let authors = catalog.authors().count().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod reports;

pub use error::{CoreError, Result};
pub use reports::{BookOverview, OverdueCopy};

use std::sync::Arc;

use chrono::NaiveDate;
use core_catalog::db::{create_pool, DatabaseConfig};
use core_catalog::repositories::{
    AuthorRepository, BookInstanceRepository, BookRepository, GenreRepository,
    LanguageRepository, SqliteAuthorRepository, SqliteBookInstanceRepository,
    SqliteBookRepository, SqliteGenreRepository, SqliteLanguageRepository,
    SqliteUserRepository, UserRepository,
};
use core_catalog::LibraryError;
use core_runtime::logging::{init_logging, strip_path};
use core_runtime::CoreConfig;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

/// Aggregated handle to every catalog repository.
#[derive(Clone)]
pub struct CatalogRepositories {
    pub genres: Arc<dyn GenreRepository>,
    pub languages: Arc<dyn LanguageRepository>,
    pub authors: Arc<dyn AuthorRepository>,
    pub books: Arc<dyn BookRepository>,
    pub copies: Arc<dyn BookInstanceRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl CatalogRepositories {
    /// SQLite-backed repositories sharing one pool.
    pub fn sqlite(pool: SqlitePool) -> Self {
        Self {
            genres: Arc::new(SqliteGenreRepository::new(pool.clone())),
            languages: Arc::new(SqliteLanguageRepository::new(pool.clone())),
            authors: Arc::new(SqliteAuthorRepository::new(pool.clone())),
            books: Arc::new(SqliteBookRepository::new(pool.clone())),
            copies: Arc::new(SqliteBookInstanceRepository::new(pool.clone())),
            users: Arc::new(SqliteUserRepository::new(pool)),
        }
    }
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CatalogService {
    repos: Arc<CatalogRepositories>,
}

impl CatalogService {
    /// Create a service from explicit repository handles.
    pub fn new(repos: CatalogRepositories) -> Self {
        Self {
            repos: Arc::new(repos),
        }
    }

    /// Open the configured database, apply migrations and wire the
    /// repositories.
    ///
    /// When `config.logging` is set, its subscriber is installed first so the
    /// bootstrap itself is logged. Leave it unset if the host already has one.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Runtime` if the configuration is invalid or a
    /// global subscriber is already installed, and
    /// `CoreError::InitializationFailed` if the database cannot be opened or
    /// migrated.
    pub async fn bootstrap(config: CoreConfig) -> Result<Self> {
        config.validate()?;

        if let Some(logging) = config.logging.clone() {
            init_logging(logging)?;
        }

        let database = if config.is_in_memory() {
            DatabaseConfig::in_memory()
        } else {
            DatabaseConfig::new(&config.database_path)
        }
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout);

        let database_path = config.database_path.to_string_lossy();
        info!(
            database = %strip_path(&database_path),
            max_connections = config.max_connections,
            "Bootstrapping catalog"
        );

        let pool = create_pool(database).await.map_err(|err| {
            warn!(error = %err, "Catalog database unavailable");
            CoreError::InitializationFailed(err.to_string())
        })?;
        Ok(Self::new(CatalogRepositories::sqlite(pool)))
    }

    pub fn genres(&self) -> Arc<dyn GenreRepository> {
        Arc::clone(&self.repos.genres)
    }

    pub fn languages(&self) -> Arc<dyn LanguageRepository> {
        Arc::clone(&self.repos.languages)
    }

    pub fn authors(&self) -> Arc<dyn AuthorRepository> {
        Arc::clone(&self.repos.authors)
    }

    pub fn books(&self) -> Arc<dyn BookRepository> {
        Arc::clone(&self.repos.books)
    }

    /// Physical copies and loan queries
    pub fn copies(&self) -> Arc<dyn BookInstanceRepository> {
        Arc::clone(&self.repos.copies)
    }

    pub fn users(&self) -> Arc<dyn UserRepository> {
        Arc::clone(&self.repos.users)
    }

    /// Copies overdue on `today`, oldest due date first.
    pub async fn overdue_report(&self, today: NaiveDate) -> Result<Vec<OverdueCopy>> {
        let overdue = self.repos.copies.find_overdue(today).await?;
        let report: Vec<_> = overdue
            .into_iter()
            .filter_map(|detail| OverdueCopy::from_detail(detail, today))
            .collect();

        debug!(%today, overdue = report.len(), "Built overdue report");
        Ok(report)
    }

    /// A book with its author's display name, genre summary and the number of
    /// copies on the shelf.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no book has this ID.
    pub async fn book_overview(&self, book_id: &str) -> Result<BookOverview> {
        let book = self
            .repos
            .books
            .find_by_id(book_id)
            .await?
            .ok_or_else(|| LibraryError::not_found("Book", book_id))?;

        let author = self.repos.authors.find_by_id(&book.author_id).await?;
        let genre = self.repos.books.genre_summary(book_id).await?;
        let available_copies = self.repos.copies.count_available_for_book(book_id).await?;

        Ok(BookOverview {
            url: book.absolute_url(),
            author: author.map(|a| a.to_string()),
            genre,
            available_copies,
            book,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_catalog::models::{Author, Book, BookInstance, BookInstanceDetail, LoanStatus};
    use core_catalog::repositories::{
        MockAuthorRepository, MockBookInstanceRepository, MockBookRepository,
        MockGenreRepository, MockLanguageRepository, MockUserRepository,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn repos_with(
        authors: MockAuthorRepository,
        books: MockBookRepository,
        copies: MockBookInstanceRepository,
    ) -> CatalogRepositories {
        CatalogRepositories {
            genres: Arc::new(MockGenreRepository::new()),
            languages: Arc::new(MockLanguageRepository::new()),
            authors: Arc::new(authors),
            books: Arc::new(books),
            copies: Arc::new(copies),
            users: Arc::new(MockUserRepository::new()),
        }
    }

    fn on_loan(title: Option<&str>, due_back: NaiveDate) -> BookInstanceDetail {
        let mut instance = BookInstance::new(Some("book-1".to_string()), "Ace, 1969");
        instance.status = LoanStatus::OnLoan;
        instance.due_back = Some(due_back);
        instance.borrower_id = Some("user-1".to_string());
        BookInstanceDetail {
            instance,
            book_title: title.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_overdue_report_counts_days() {
        let today = date(2024, 1, 10);
        let rows = vec![
            on_loan(Some("The Left Hand of Darkness"), date(2024, 1, 3)),
            on_loan(None, date(2024, 1, 9)),
        ];
        let expected_ids: Vec<_> = rows.iter().map(|r| r.instance.id().to_string()).collect();

        let mut copies = MockBookInstanceRepository::new();
        copies
            .expect_find_overdue()
            .times(1)
            .returning(move |_| Ok(rows.clone()));

        let service = CatalogService::new(repos_with(
            MockAuthorRepository::new(),
            MockBookRepository::new(),
            copies,
        ));

        let report = service.overdue_report(today).await.unwrap();
        assert_eq!(report.len(), 2);

        assert_eq!(report[0].instance_id, expected_ids[0]);
        assert_eq!(report[0].days_overdue, 7);
        assert_eq!(
            report[0].label,
            format!("{} (The Left Hand of Darkness)", expected_ids[0])
        );

        assert_eq!(report[1].days_overdue, 1);
        assert_eq!(report[1].label, format!("{} (no book)", expected_ids[1]));
        assert_eq!(report[1].borrower_id.as_deref(), Some("user-1"));
    }

    #[tokio::test]
    async fn test_overdue_report_drops_rows_not_overdue() {
        let today = date(2024, 1, 10);
        let due_today = on_loan(Some("Dune"), today);

        let mut copies = MockBookInstanceRepository::new();
        copies
            .expect_find_overdue()
            .returning(move |_| Ok(vec![due_today.clone()]));

        let service = CatalogService::new(repos_with(
            MockAuthorRepository::new(),
            MockBookRepository::new(),
            copies,
        ));

        assert!(service.overdue_report(today).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_book_overview() {
        let author = Author::new("Ursula", "Le Guin");
        let book = Book::new("The Dispossessed", &author.id, "9780060512750");
        let book_id = book.id.clone();

        let mut authors = MockAuthorRepository::new();
        let found_author = author.clone();
        authors
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found_author.clone())));

        let mut books = MockBookRepository::new();
        let found_book = book.clone();
        books
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found_book.clone())));
        books
            .expect_genre_summary()
            .returning(|_| Ok("Science Fiction, Utopian".to_string()));

        let mut copies = MockBookInstanceRepository::new();
        copies
            .expect_count_available_for_book()
            .returning(|_| Ok(2));

        let service = CatalogService::new(repos_with(authors, books, copies));
        let overview = service.book_overview(&book_id).await.unwrap();

        assert_eq!(overview.book, book);
        assert_eq!(overview.author.as_deref(), Some("Le Guin, Ursula"));
        assert_eq!(overview.genre, "Science Fiction, Utopian");
        assert_eq!(overview.available_copies, 2);
        assert_eq!(overview.url, format!("/catalog/book/{}", book_id));
    }

    #[tokio::test]
    async fn test_book_overview_missing_book() {
        let mut books = MockBookRepository::new();
        books.expect_find_by_id().returning(|_| Ok(None));

        let service = CatalogService::new(repos_with(
            MockAuthorRepository::new(),
            books,
            MockBookInstanceRepository::new(),
        ));

        let result = service.book_overview("missing").await;
        assert!(matches!(
            result,
            Err(CoreError::Library(LibraryError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_bootstrap_in_memory() {
        let config = CoreConfig::builder().in_memory().build().unwrap();
        let service = CatalogService::bootstrap(config).await.unwrap();

        assert_eq!(service.authors().count().await.unwrap(), 0);
        assert_eq!(service.copies().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_bootstrap_reports_unopenable_database() {
        let missing_dir = std::env::temp_dir()
            .join("catalog-service-missing-dir")
            .join("nested")
            .join("library.db");
        let config = CoreConfig::builder()
            .database_path(missing_dir)
            .build()
            .unwrap();

        let result = CatalogService::bootstrap(config).await;
        assert!(matches!(result, Err(CoreError::InitializationFailed(_))));
    }

    #[tokio::test]
    async fn test_bootstrap_rejects_invalid_config() {
        let config = CoreConfig {
            max_connections: 0,
            ..CoreConfig::builder().in_memory().build().unwrap()
        };

        let result = CatalogService::bootstrap(config).await;
        assert!(matches!(result, Err(CoreError::Runtime(_))));
    }
}
