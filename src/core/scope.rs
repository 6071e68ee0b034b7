//! Category scoping.
//!
//! Admin categories live in one global namespace, while every seller gets a private
//! catalogue. Both variants share the same engine and differ only in the filter applied
//! to every lookup.

use crate::entities::category;
use sea_orm::{Condition, prelude::*};
use serde::{Deserialize, Serialize};

/// Namespace in which category names must be unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "seller_id")]
pub enum CategoryScope {
    /// Marketplace-wide categories managed by administrators
    Global,
    /// Categories owned by one seller
    Seller(i64),
}

impl CategoryScope {
    /// Owning seller stored on rows of this scope.
    #[must_use]
    pub const fn seller_id(self) -> Option<i64> {
        match self {
            Self::Global => None,
            Self::Seller(id) => Some(id),
        }
    }

    /// Scope a stored row belongs to.
    #[must_use]
    pub const fn of(category: &category::Model) -> Self {
        match category.seller_id {
            None => Self::Global,
            Some(id) => Self::Seller(id),
        }
    }

    /// Restricts a category query to this scope.
    #[must_use]
    pub fn condition(self) -> Condition {
        match self {
            Self::Global => Condition::all().add(category::Column::SellerId.is_null()),
            Self::Seller(id) => Condition::all().add(category::Column::SellerId.eq(id)),
        }
    }

    /// True when `category` is visible from this scope.
    #[must_use]
    pub fn contains(self, category: &category::Model) -> bool {
        Self::of(category) == self
    }
}

impl std::fmt::Display for CategoryScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Seller(id) => write!(f, "seller:{id}"),
        }
    }
}
