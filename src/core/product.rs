//! Product business logic - The part of the product inventory categories depend on.
//!
//! Products are listed under a category of their seller's scope. The category engine
//! asks this module how many live products a category holds before deleting it, and
//! clears out soft-deleted rows when the delete goes ahead.

use crate::{
    core::CategoryScope,
    entities::{Category, Product, product},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};

/// Lists the non-deleted products of a category, ordered alphabetically by name.
pub async fn list_products_in_category(
    db: &DatabaseConnection,
    category_id: i64,
) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::CategoryId.eq(category_id))
        .filter(product::Column::IsDeleted.eq(false))
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific product by its unique ID, deleted or not.
pub async fn get_product_by_id(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Option<product::Model>> {
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a product under a category of `scope`.
///
/// # Errors
/// Returns an error if:
/// - The product name is empty or whitespace-only
/// - The price is negative or not finite (NaN, infinity)
/// - The category does not exist in `scope` or is inactive
/// - The database insert operation fails
pub async fn create_product(
    db: &DatabaseConnection,
    scope: CategoryScope,
    category_id: i64,
    name: String,
    price: f64,
) -> Result<product::Model> {
    if name.trim().is_empty() {
        return Err(Error::validation("name", "Product name cannot be empty"));
    }

    if !price.is_finite() || price < 0.0 {
        return Err(Error::validation(
            "price",
            format!("Invalid price {price}: must be a non-negative number"),
        ));
    }

    let category = Category::find_by_id(category_id)
        .filter(scope.condition())
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "category",
            id: category_id,
        })?;

    if !category.is_active {
        return Err(Error::validation(
            "category_id",
            format!("Category '{}' is inactive", category.name),
        ));
    }

    let now = chrono::Utc::now().naive_utc();
    let product = product::ActiveModel {
        category_id: Set(category_id),
        seller_id: Set(scope.seller_id()),
        name: Set(name.trim().to_string()),
        price: Set(price),
        is_deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    product.insert(db).await.map_err(Into::into)
}

/// Soft deletes a product by marking it as deleted.
///
/// # Errors
/// Returns an error if:
/// - The product does not exist or is already deleted
/// - The database update operation fails
pub async fn delete_product(db: &DatabaseConnection, product_id: i64) -> Result<product::Model> {
    let mut product: product::ActiveModel = Product::find_by_id(product_id)
        .one(db)
        .await?
        .filter(|p| !p.is_deleted)
        .ok_or(Error::NotFound {
            entity: "product",
            id: product_id,
        })?
        .into();

    product.is_deleted = Set(true);
    product.updated_at = Set(chrono::Utc::now().naive_utc());

    product.update(db).await.map_err(Into::into)
}

/// Number of non-deleted products listed under `category_id`.
pub async fn count_live_products<C>(db: &C, category_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    Product::find()
        .filter(product::Column::CategoryId.eq(category_id))
        .filter(product::Column::IsDeleted.eq(false))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Hard deletes the soft-deleted products of `category_id`, returning how many went.
pub async fn purge_deleted_products<C>(db: &C, category_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = Product::delete_many()
        .filter(product::Column::CategoryId.eq(category_id))
        .filter(product::Column::IsDeleted.eq(true))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_product_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        // Test empty name validation
        let result = create_product(&db, CategoryScope::Global, 1, String::new(), 10.0).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { field: "name", .. }
        ));

        // Test negative price validation
        let result =
            create_product(&db, CategoryScope::Global, 1, "Eggs".to_string(), -10.0).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { field: "price", .. }
        ));

        // Test NaN price validation
        let result =
            create_product(&db, CategoryScope::Global, 1, "Eggs".to_string(), f64::NAN).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { field: "price", .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_product_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let category = create_seller_category(&db, 11, "Honey", None).await?;

        let product = create_product(
            &db,
            CategoryScope::Seller(11),
            category.id,
            " Wildflower Honey 500g ".to_string(),
            8.5,
        )
        .await?;

        assert_eq!(product.name, "Wildflower Honey 500g");
        assert_eq!(product.price, 8.5);
        assert_eq!(product.category_id, category.id);
        assert_eq!(product.seller_id, Some(11));
        assert!(!product.is_deleted);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_product_requires_active_category_in_scope() -> Result<()> {
        let db = setup_test_db().await?;
        let category = create_seller_category(&db, 11, "Honey", None).await?;

        // Another seller cannot list under it
        let result = create_product(
            &db,
            CategoryScope::Seller(12),
            category.id,
            "Honey".to_string(),
            5.0,
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));

        crate::core::category::toggle_status(&db, CategoryScope::Seller(11), category.id).await?;
        let result = create_product(
            &db,
            CategoryScope::Seller(11),
            category.id,
            "Honey".to_string(),
            5.0,
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation {
                field: "category_id",
                ..
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_product_and_counts() -> Result<()> {
        let db = setup_test_db().await?;
        let category = create_test_category(&db, "Eggs", None).await?;
        let dozen = create_test_product(&db, category.id, "Dozen").await?;
        let half = create_test_product(&db, category.id, "Half dozen").await?;

        assert_eq!(count_live_products(&db, category.id).await?, 2);

        let deleted = delete_product(&db, dozen.id).await?;
        assert!(deleted.is_deleted);
        assert_eq!(count_live_products(&db, category.id).await?, 1);

        let listed = list_products_in_category(&db, category.id).await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, half.id);

        // Deleting twice is reported as missing
        let result = delete_product(&db, dozen.id).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));

        assert_eq!(purge_deleted_products(&db, category.id).await?, 1);
        assert!(get_product_by_id(&db, dozen.id).await?.is_none());
        assert!(get_product_by_id(&db, half.id).await?.is_some());

        Ok(())
    }
}
