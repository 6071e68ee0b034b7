//! Database configuration module.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! Tables come from `Schema::create_table_from_entity`, so the schema always matches the
//! entity definitions. The composite indexes the category engine relies on are added
//! on top: scoped name and sequence uniqueness, and the parent lookup used by every
//! descendant and child-count query.

use crate::entities::{Category, Product, category, product};
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, Schema,
    sea_query::{Index, IndexCreateStatement},
};

const DEFAULT_DATABASE_URL: &str = "sqlite://farm_market.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(&get_database_url())
        .await
        .map_err(Into::into)
}

fn category_indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .name("idx_categories_seller_name_key")
            .table(Category)
            .col(category::Column::SellerId)
            .col(category::Column::NameKey)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_categories_seller_sequence")
            .table(Category)
            .col(category::Column::SellerId)
            .col(category::Column::SellerSequence)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_categories_parent")
            .table(Category)
            .col(category::Column::ParentCategoryId)
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_products_category")
            .table(Product)
            .col(product::Column::CategoryId)
            .if_not_exists()
            .to_owned(),
    ]
}

/// Creates all tables and indexes if they do not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut category_table = schema.create_table_from_entity(Category);
    category_table.if_not_exists();
    let mut product_table = schema.create_table_from_entity(Product);
    product_table.if_not_exists();

    db.execute(builder.build(&category_table)).await?;
    db.execute(builder.build(&product_table)).await?;

    for index in category_indexes() {
        db.execute(builder.build(&index)).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{CategoryModel, ProductModel};
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<CategoryModel> = Category::find().limit(1).all(&db).await?;
        let _: Vec<ProductModel> = Product::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_twice() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
