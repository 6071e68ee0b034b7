//! Shared test utilities for the category engine.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        CategoryScope,
        category::{self, CategoryInput},
        product,
    },
    entities::{self, Category},
    errors::Result,
};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use tracing_subscriber::EnvFilter;

/// Routes `tracing` output through the test harness, once per process.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates an active global category, optionally under `parent_id`.
pub async fn create_test_category(
    db: &DatabaseConnection,
    name: &str,
    parent_id: Option<i64>,
) -> Result<entities::category::Model> {
    category::create_category(
        db,
        CategoryScope::Global,
        CategoryInput {
            name: name.to_string(),
            parent_id,
            ..CategoryInput::default()
        },
    )
    .await
}

/// Creates an active category owned by `seller_id`.
pub async fn create_seller_category(
    db: &DatabaseConnection,
    seller_id: i64,
    name: &str,
    parent_id: Option<i64>,
) -> Result<entities::category::Model> {
    category::create_category(
        db,
        CategoryScope::Seller(seller_id),
        CategoryInput {
            name: name.to_string(),
            parent_id,
            ..CategoryInput::default()
        },
    )
    .await
}

/// Creates a product priced 10.0 under a global category.
pub async fn create_test_product(
    db: &DatabaseConnection,
    category_id: i64,
    name: &str,
) -> Result<entities::product::Model> {
    product::create_product(db, CategoryScope::Global, category_id, name.to_string(), 10.0).await
}

/// Every category row, ordered by ID, for before/after comparisons.
pub async fn snapshot_categories(
    db: &DatabaseConnection,
) -> Result<Vec<entities::category::Model>> {
    Category::find()
        .order_by_asc(entities::category::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
