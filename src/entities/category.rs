//! Category entity - Represents one node of a category tree.
//!
//! Global categories have no `seller_id`. Seller categories carry the owning seller and
//! a seller-local sequence number. The optional `parent_category_id` points at another
//! row of the same table and must never form a cycle.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    /// Unique identifier for the category
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning seller, None for global (admin) categories
    pub seller_id: Option<i64>,
    /// Position in the owning seller's catalogue, None for global categories
    pub seller_sequence: Option<i32>,
    /// Display name (e.g., "Vegetables"), unique within its scope
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub name: String,
    /// Lowercased name used for scoped uniqueness checks
    #[sea_orm(column_type = "String(StringLen::N(400))")]
    pub name_key: String,
    /// Optional free-form description
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// Whether the category is visible and usable as a parent
    pub is_active: bool,
    /// Parent category, None for a root
    pub parent_category_id: Option<i64>,
    /// When the category was created
    pub created_at: DateTime,
    /// When the category was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Category and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each category optionally belongs to a parent category
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentCategoryId",
        to = "Column::Id",
        on_delete = "Restrict"
    )]
    Parent,
    /// One category has many products
    #[sea_orm(has_many = "super::product::Entity")]
    Products,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// True when the category has no parent.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_category_id.is_none()
    }
}
