//! Relationship and permission declarations for the catalog schema
//!
//! Every foreign key in the catalog carries its own deletion policy. The
//! policies are listed here so callers can reason about what a delete will
//! touch; the migration enforces the same policies with `ON DELETE` clauses.

use serde::Serialize;

/// What happens to a referencing row when the row it points to is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeletePolicy {
    /// The referencing row is deleted as well (ownership)
    Cascade,
    /// The referencing column is set to NULL and the row survives
    SetNull,
}

impl DeletePolicy {
    /// The SQLite `ON DELETE` action implementing this policy
    pub fn sql_action(self) -> &'static str {
        match self {
            DeletePolicy::Cascade => "CASCADE",
            DeletePolicy::SetNull => "SET NULL",
        }
    }
}

/// A foreign key from `table.column` to `references`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Relationship {
    pub table: &'static str,
    pub column: &'static str,
    pub references: &'static str,
    pub on_delete: DeletePolicy,
}

/// All catalog relationships and their deletion policies
pub const RELATIONSHIPS: &[Relationship] = &[
    Relationship {
        table: "books",
        column: "author_id",
        references: "authors",
        on_delete: DeletePolicy::Cascade,
    },
    Relationship {
        table: "books",
        column: "language_id",
        references: "languages",
        on_delete: DeletePolicy::SetNull,
    },
    Relationship {
        table: "book_genres",
        column: "book_id",
        references: "books",
        on_delete: DeletePolicy::Cascade,
    },
    Relationship {
        table: "book_genres",
        column: "genre_id",
        references: "genres",
        on_delete: DeletePolicy::Cascade,
    },
    Relationship {
        table: "book_instances",
        column: "book_id",
        references: "books",
        on_delete: DeletePolicy::SetNull,
    },
    Relationship {
        table: "book_instances",
        column: "borrower_id",
        references: "users",
        on_delete: DeletePolicy::SetNull,
    },
    Relationship {
        table: "book_instances",
        column: "language_id",
        references: "languages",
        on_delete: DeletePolicy::SetNull,
    },
];

/// Relationships whose rows are affected when a row of `table` is deleted
pub fn dependents_of(table: &str) -> impl Iterator<Item = &'static Relationship> + '_ {
    RELATIONSHIPS.iter().filter(move |rel| rel.references == table)
}

/// A named permission checked by the host's auth layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Permission {
    pub codename: &'static str,
    pub description: &'static str,
}

impl Permission {
    /// `"catalog.<codename>"`
    pub fn qualified_name(&self) -> String {
        format!("catalog.{}", self.codename)
    }
}

/// Allows a librarian to record a copy as returned
pub const CAN_MARK_RETURNED: Permission = Permission {
    codename: "can_mark_returned",
    description: "Set book as returned",
};
