//! Domain models for the library catalog
//!
//! Each model mirrors one table of the catalog schema, carries its own
//! validation, and knows how to present itself in listings.

use crate::error::LibraryError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// Field limits
// =============================================================================

/// Maximum length of genre, language, author last name and book title
pub const NAME_MAX_LEN: usize = 200;
/// Maximum length of an author's first name
pub const FIRST_NAME_MAX_LEN: usize = 100;
/// Maximum length of a book summary
pub const SUMMARY_MAX_LEN: usize = 1000;
/// Maximum length of an ISBN (ISBN-13 without separators)
pub const ISBN_MAX_LEN: usize = 13;
/// Maximum length of a copy's imprint
pub const IMPRINT_MAX_LEN: usize = 200;
/// Maximum length of a username
pub const USERNAME_MAX_LEN: usize = 150;

/// Number of genre names shown in a book's genre summary
pub const GENRE_SUMMARY_LIMIT: usize = 3;

/// Shown in place of the title when a copy's book reference has been cleared
pub const MISSING_BOOK_TITLE: &str = "no book";

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn check_required(label: &str, value: &str, max_len: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} cannot be empty", label));
    }
    check_length(label, value, max_len)
}

fn check_length(label: &str, value: &str, max_len: usize) -> Result<(), String> {
    let len = value.chars().count();
    if len > max_len {
        return Err(format!(
            "{} is {} characters long, maximum is {}",
            label, len, max_len
        ));
    }
    Ok(())
}

// =============================================================================
// Genre & Language
// =============================================================================

/// Literary genre (e.g. "Science Fiction")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Genre {
    pub id: String,
    pub name: String,
}

impl Genre {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        check_required("Genre name", &self.name, NAME_MAX_LEN)
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Natural language a book is written in (e.g. "English", "French")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Language {
    pub id: String,
    pub name: String,
}

impl Language {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        check_required("Language name", &self.name, NAME_MAX_LEN)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// =============================================================================
// Author
// =============================================================================

/// Book author. Listings are ordered by last name, then first name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Author {
    /// Unique identifier
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Optional free-form full name (pen names, particles, ...)
    pub full_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            full_name: None,
            date_of_birth: None,
            date_of_death: None,
        }
    }

    /// Validate author data
    pub fn validate(&self) -> Result<(), String> {
        check_required("Author first name", &self.first_name, FIRST_NAME_MAX_LEN)?;
        check_required("Author last name", &self.last_name, NAME_MAX_LEN)?;

        if let Some(full_name) = &self.full_name {
            check_length("Author full name", full_name, NAME_MAX_LEN)?;
        }

        if let (Some(born), Some(died)) = (self.date_of_birth, self.date_of_death) {
            if died < born {
                return Err(format!(
                    "Author date of death {} precedes date of birth {}",
                    died, born
                ));
            }
        }

        Ok(())
    }

    /// Listing order: `(last_name, first_name)` ascending
    pub fn listing_cmp(&self, other: &Self) -> Ordering {
        (&self.last_name, &self.first_name).cmp(&(&other.last_name, &other.first_name))
    }

    /// Path of the author's detail page
    pub fn absolute_url(&self) -> String {
        format!("/catalog/author/{}", self.id)
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.last_name, self.first_name)
    }
}

// =============================================================================
// Book
// =============================================================================

/// A title in the catalog. Genres live in the `book_genres` link table and are
/// managed through the book repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Book {
    /// Unique identifier
    pub id: String,
    pub title: String,
    /// Owning author; deleting the author deletes the book
    pub author_id: String,
    /// Brief description of the book
    pub summary: String,
    pub isbn: String,
    /// Cleared when the language is deleted
    pub language_id: Option<String>,
}

impl Book {
    pub fn new(
        title: impl Into<String>,
        author_id: impl Into<String>,
        isbn: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            author_id: author_id.into(),
            summary: String::new(),
            isbn: isbn.into(),
            language_id: None,
        }
    }

    /// Validate book data
    pub fn validate(&self) -> Result<(), String> {
        check_required("Book title", &self.title, NAME_MAX_LEN)?;

        if self.author_id.trim().is_empty() {
            return Err("Book must reference an author".to_string());
        }

        check_length("Book summary", &self.summary, SUMMARY_MAX_LEN)?;
        check_required("Book ISBN", &self.isbn, ISBN_MAX_LEN)?;

        Ok(())
    }

    /// Comma-joined list of at most the first [`GENRE_SUMMARY_LIMIT`] genre
    /// names, in the order they are given.
    pub fn display_genre<I, S>(genre_names: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        genre_names
            .into_iter()
            .take(GENRE_SUMMARY_LIMIT)
            .map(|name| name.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Path of the book's detail page
    pub fn absolute_url(&self) -> String {
        format!("/catalog/book/{}", self.id)
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

// =============================================================================
// Loan status
// =============================================================================

/// Availability of a copy, persisted as a one-letter code.
///
/// There are no enforced transitions: any status may be written at any time.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
pub enum LoanStatus {
    #[default]
    #[serde(rename = "m")]
    #[sqlx(rename = "m")]
    Maintenance,
    #[serde(rename = "o")]
    #[sqlx(rename = "o")]
    OnLoan,
    #[serde(rename = "a")]
    #[sqlx(rename = "a")]
    Available,
    #[serde(rename = "r")]
    #[sqlx(rename = "r")]
    Reserved,
}

impl LoanStatus {
    pub const ALL: [LoanStatus; 4] = [
        LoanStatus::Maintenance,
        LoanStatus::OnLoan,
        LoanStatus::Available,
        LoanStatus::Reserved,
    ];

    /// Persisted one-letter code
    pub fn code(self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "m",
            LoanStatus::OnLoan => "o",
            LoanStatus::Available => "a",
            LoanStatus::Reserved => "r",
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "Maintenance",
            LoanStatus::OnLoan => "On loan",
            LoanStatus::Available => "Available",
            LoanStatus::Reserved => "Reserved",
        }
    }
}

impl FromStr for LoanStatus {
    type Err = LibraryError;

    /// Parse a persisted status code. Anything outside the four codes is rejected.
    fn from_str(code: &str) -> Result<Self, Self::Err> {
        LoanStatus::ALL
            .into_iter()
            .find(|status| status.code() == code)
            .ok_or_else(|| {
                LibraryError::invalid("status", format!("unknown loan status code {:?}", code))
            })
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// User
// =============================================================================

/// Library member who can borrow copies. Authentication lives elsewhere; the
/// catalog only keeps enough to reference the borrower.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            username: username.into(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        check_required("Username", &self.username, USERNAME_MAX_LEN)
    }
}

// =============================================================================
// Book instance
// =============================================================================

/// One physical, lendable copy of a book.
///
/// The identifier is a UUID assigned at construction and never changes; it is
/// only readable through [`BookInstance::id`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct BookInstance {
    id: String,
    /// Cleared when the book is deleted
    pub book_id: Option<String>,
    /// Publisher and edition details
    pub imprint: String,
    /// Date the copy is due back, if lent out
    pub due_back: Option<NaiveDate>,
    /// Member currently holding the copy; cleared when the user is deleted
    pub borrower_id: Option<String>,
    pub status: LoanStatus,
    /// Cleared when the language is deleted
    pub language_id: Option<String>,
}

impl BookInstance {
    /// Create a new copy in maintenance, with a freshly generated id
    pub fn new(book_id: Option<String>, imprint: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            book_id,
            imprint: imprint.into(),
            due_back: None,
            borrower_id: None,
            status: LoanStatus::default(),
            language_id: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Validate copy data
    pub fn validate(&self) -> Result<(), String> {
        check_required("Imprint", &self.imprint, IMPRINT_MAX_LEN)
    }

    /// A copy is overdue when it has a due date and `today` is strictly after it.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        matches!(self.due_back, Some(due_back) if today > due_back)
    }

    /// Listing order: `due_back` ascending with undated copies first, then id
    pub fn listing_cmp(&self, other: &Self) -> Ordering {
        self.due_back
            .cmp(&other.due_back)
            .then_with(|| self.id.cmp(&other.id))
    }

    /// `"{id} ({title})"`, falling back to [`MISSING_BOOK_TITLE`] when the book
    /// reference has been cleared
    pub fn display_with_title(&self, book_title: Option<&str>) -> String {
        format!(
            "{} ({})",
            self.id,
            book_title.unwrap_or(MISSING_BOOK_TITLE)
        )
    }
}

/// A copy joined with the title of its book, for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct BookInstanceDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub instance: BookInstance,
    pub book_title: Option<String>,
}

impl fmt::Display for BookInstanceDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(
            &self
                .instance
                .display_with_title(self.book_title.as_deref()),
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
