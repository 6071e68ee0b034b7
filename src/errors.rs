//! Unified error types for the category engine.
//!
//! Every expected rejection (bad input, missing rows, cycles, cascade guards) is a
//! typed variant the caller can match on. Storage failures are kept separate so the
//! presentation layer can log them and answer with a generic message.

use thiserror::Error;

/// Why an operation was blocked by the state of related categories or products.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeBlock {
    /// Deactivation refused while direct children are still active.
    ActiveChildren {
        /// Number of active direct children
        count: u64,
    },
    /// Activation refused because the parent is inactive.
    InactiveParent {
        /// The inactive parent
        parent_id: i64,
    },
    /// Deletion refused because the category is not a leaf.
    HasChildren {
        /// Number of direct children, active or not
        count: u64,
    },
    /// Deletion refused because live products still reference the category.
    HasProducts {
        /// Number of non-deleted products in the category
        count: u64,
    },
}

impl std::fmt::Display for CascadeBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ActiveChildren { count } => write!(
                f,
                "Cannot deactivate category while it has active sub-categories. It has {count} active sub-category(s)."
            ),
            Self::InactiveParent { .. } => write!(
                f,
                "Cannot activate category because it has an inactive parent. Activate the parent category first."
            ),
            Self::HasChildren { count } => {
                write!(f, "Cannot delete category. It has {count} sub-category(s).")
            }
            Self::HasProducts { count } => {
                write!(f, "Cannot delete category. It has {count} product(s).")
            }
        }
    }
}

/// Coarse classification of an [`Error`], used to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input or a uniqueness clash
    Validation,
    /// A referenced row does not exist in the caller's scope
    NotFound,
    /// The requested parent exists but cannot be used
    InvalidParent,
    /// The requested parent would close a loop
    CircularReference,
    /// Related rows block the change
    CascadeBlocked,
    /// Storage, I/O or configuration failure
    Infrastructure,
}

/// Every failure the crate can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Input failed semantic validation (empty or long name, duplicate in scope).
    #[error("{message}")]
    Validation {
        /// Input field the message belongs to
        field: &'static str,
        /// Human readable explanation
        message: String,
    },

    /// The referenced row is missing or belongs to another scope.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of row that was looked up (`"category"`, `"parent category"`, `"product"`)
        entity: &'static str,
        /// Identifier that was looked up
        id: i64,
    },

    /// The parent is missing at creation time or is not active.
    #[error("The selected parent category ({parent_id}) does not exist or is inactive.")]
    InvalidParent {
        /// The rejected parent
        parent_id: i64,
    },

    /// The parent is the category itself or one of its descendants.
    #[error(
        "Category {category_id} cannot use {parent_id} as its parent: it is the category itself or one of its sub-categories."
    )]
    CircularReference {
        /// Category being re-parented
        category_id: i64,
        /// Proposed parent
        parent_id: i64,
    },

    /// The change is blocked by children, parent or products.
    #[error("{0}")]
    CascadeBlocked(CascadeBlock),

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// The persistence store failed.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] on `field`.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Classifies the error for the presentation layer.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidParent { .. } => ErrorKind::InvalidParent,
            Self::CircularReference { .. } => ErrorKind::CircularReference,
            Self::CascadeBlocked(_) => ErrorKind::CascadeBlocked,
            Self::Config { .. } | Self::Database(_) | Self::Io(_) => ErrorKind::Infrastructure,
        }
    }

    /// True for failures that are not the caller's fault.
    #[must_use]
    pub const fn is_infrastructure(&self) -> bool {
        matches!(self.kind(), ErrorKind::Infrastructure)
    }

    /// Input field an error should be attached to on a form, if any.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        match self {
            Self::Validation { field, .. } => Some(*field),
            Self::InvalidParent { .. } | Self::CircularReference { .. } => {
                Some("parent_category_id")
            }
            _ => None,
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
