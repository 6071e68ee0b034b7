//! Catalogue seeding from `catalog.toml`.
//!
//! Seeding goes through the regular create path, so seeded rows obey every
//! invariant the admin screens enforce. Names already present in the scope are skipped,
//! which makes repeated runs harmless.

use crate::{
    config::catalog::CatalogConfig,
    core::{
        CategoryScope,
        category::{self, CategoryInput},
    },
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use tracing::{debug, info, instrument};

/// What a seeding run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Names of the categories inserted by this run
    pub created: Vec<String>,
    /// Names that already existed in the scope
    pub skipped: Vec<String>,
}

/// Creates every category of `catalog` missing from `scope`, in file order.
///
/// A seed's `parent` is resolved by name and must name a category that already exists
/// or appears earlier in the file.
///
/// # Errors
/// Returns [`Error::Config`] when a parent name cannot be resolved. Errors from the
/// create operation itself (for example an inactive parent) are passed through.
#[instrument(skip(db, catalog), fields(entries = catalog.categories.len()))]
pub async fn seed_categories(
    db: &DatabaseConnection,
    scope: CategoryScope,
    catalog: &CatalogConfig,
) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    for seed in &catalog.categories {
        if category::get_category_by_name(db, scope, &seed.name)
            .await?
            .is_some()
        {
            debug!(name = %seed.name, "category already present, skipping");
            report.skipped.push(seed.name.clone());
            continue;
        }

        let parent_id = match &seed.parent {
            Some(parent_name) => {
                let parent = category::get_category_by_name(db, scope, parent_name)
                    .await?
                    .ok_or_else(|| Error::Config {
                        message: format!(
                            "Category '{}' names unknown parent '{parent_name}'; parents must be listed before their children",
                            seed.name
                        ),
                    })?;
                Some(parent.id)
            }
            None => None,
        };

        let input = CategoryInput {
            name: seed.name.clone(),
            description: seed.description.clone(),
            parent_id,
            is_active: Some(seed.active),
        };
        let created = category::create_category(db, scope, input).await?;
        report.created.push(created.name);
    }

    info!(
        created = report.created.len(),
        skipped = report.skipped.len(),
        %scope,
        "category seeding finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    const CATALOG: &str = r#"
        [[categories]]
        name = "Vegetables"
        description = "Fresh vegetables"

        [[categories]]
        name = "Tomatoes"
        parent = "Vegetables"

        [[categories]]
        name = "Preserves"
        active = false
    "#;

    #[tokio::test]
    async fn test_seed_categories_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let catalog: CatalogConfig = toml::from_str(CATALOG).unwrap();

        let first = seed_categories(&db, CategoryScope::Global, &catalog).await?;
        assert_eq!(first.created, vec!["Vegetables", "Tomatoes", "Preserves"]);
        assert!(first.skipped.is_empty());

        let tomatoes = category::get_category_by_name(&db, CategoryScope::Global, "Tomatoes")
            .await?
            .unwrap();
        let vegetables = category::get_category_by_name(&db, CategoryScope::Global, "Vegetables")
            .await?
            .unwrap();
        assert_eq!(tomatoes.parent_category_id, Some(vegetables.id));
        let preserves = category::get_category_by_name(&db, CategoryScope::Global, "Preserves")
            .await?
            .unwrap();
        assert!(!preserves.is_active);

        let second = seed_categories(&db, CategoryScope::Global, &catalog).await?;
        assert!(second.created.is_empty());
        assert_eq!(second.skipped.len(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_reseeding_skips_non_ascii_names() -> Result<()> {
        let db = setup_test_db().await?;
        let catalog: CatalogConfig = toml::from_str(
            r#"
            [[categories]]
            name = "Épices"

            [[categories]]
            name = "Piments d'Espelette"
            parent = "ÉPICES"
        "#,
        )
        .unwrap();

        let first = seed_categories(&db, CategoryScope::Global, &catalog).await?;
        assert_eq!(first.created.len(), 2);

        let second = seed_categories(&db, CategoryScope::Global, &catalog).await?;
        assert!(second.created.is_empty());
        assert_eq!(second.skipped, vec!["Épices", "Piments d'Espelette"]);
        assert_eq!(
            category::list_categories(&db, CategoryScope::Global).await?.len(),
            2
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_rejects_unknown_parent() -> Result<()> {
        let db = setup_test_db().await?;
        let catalog: CatalogConfig = toml::from_str(
            r#"
            [[categories]]
            name = "Tomatoes"
            parent = "Vegetables"
        "#,
        )
        .unwrap();

        let result = seed_categories(&db, CategoryScope::Seller(4), &catalog).await;
        assert!(matches!(result.unwrap_err(), Error::Config { .. }));
        Ok(())
    }
}
