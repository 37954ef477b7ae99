//! Read models assembled from several repositories

use chrono::NaiveDate;
use core_catalog::models::{Book, BookInstanceDetail};
use serde::Serialize;

/// One line of the overdue report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverdueCopy {
    pub instance_id: String,
    /// `"{id} ({title})"` as shown in copy listings
    pub label: String,
    pub borrower_id: Option<String>,
    pub due_back: NaiveDate,
    pub days_overdue: i64,
}

impl OverdueCopy {
    /// `None` unless the copy is overdue on `today`.
    pub fn from_detail(detail: BookInstanceDetail, today: NaiveDate) -> Option<Self> {
        if !detail.instance.is_overdue(today) {
            return None;
        }
        let due_back = detail.instance.due_back?;

        Some(Self {
            instance_id: detail.instance.id().to_string(),
            label: detail.to_string(),
            days_overdue: (today - due_back).num_days(),
            borrower_id: detail.instance.borrower_id,
            due_back,
        })
    }
}

/// A book as shown on its detail page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookOverview {
    pub book: Book,
    /// `"Last, First"`, absent only if the author row vanished mid-read
    pub author: Option<String>,
    /// First three genre names, comma-joined
    pub genre: String,
    pub available_copies: i64,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_catalog::models::BookInstance;

    #[test]
    fn test_overdue_copy_serializes_date_as_iso() {
        let mut instance = BookInstance::new(None, "Gollancz, 1974");
        instance.due_back = NaiveDate::from_ymd_opt(2024, 1, 9);
        let id = instance.id().to_string();

        let detail = BookInstanceDetail {
            instance,
            book_title: None,
        };
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let line = OverdueCopy::from_detail(detail, today).unwrap();

        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["due_back"], "2024-01-09");
        assert_eq!(json["days_overdue"], 1);
        assert_eq!(json["label"], format!("{} (no book)", id));
        assert!(json["borrower_id"].is_null());
    }

    #[test]
    fn test_undated_copy_is_never_reported() {
        let detail = BookInstanceDetail {
            instance: BookInstance::new(None, "Gollancz, 1974"),
            book_title: Some("The Dispossessed".to_string()),
        };
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert!(OverdueCopy::from_detail(detail, today).is_none());
    }
}
