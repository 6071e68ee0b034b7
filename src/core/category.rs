//! Category business logic - Handles every category operation for both scopes.
//!
//! Mutations run inside a single transaction: the guards read through the same handle
//! that performs the write, so a concurrent change cannot slip between the check and the
//! update. Returning an error drops the transaction, which rolls it back and leaves every
//! row untouched.

use crate::{
    core::{CategoryScope, begin_serializable, hierarchy, hierarchy::CategoryNode, product},
    entities::{Category, category},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};
use serde::Serialize;
use tracing::{error, info, instrument, warn};

/// Fields accepted by [`create_category`] and [`update_category`].
///
/// Update replaces name, description and parent wholesale: `parent_id = None` turns the
/// category into a root. `is_active = None` means "default" on create (active) and
/// "unchanged" on update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryInput {
    /// Display name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Optional parent category
    pub parent_id: Option<i64>,
    /// Optional active flag
    pub is_active: Option<bool>,
}

impl CategoryInput {
    /// Input with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the parent.
    #[must_use]
    pub const fn with_parent(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the active flag explicitly.
    #[must_use]
    pub const fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }
}

/// Outcome of [`toggle_status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    /// The category after the flip
    pub category: category::Model,
}

impl StatusChange {
    /// `"activated"` or `"deactivated"`, matching the new state.
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        if self.category.is_active {
            "activated"
        } else {
            "deactivated"
        }
    }
}

fn not_found(id: i64) -> Error {
    Error::NotFound {
        entity: "category",
        id,
    }
}

fn log_rejection(operation: &str, scope: CategoryScope, category_id: Option<i64>, err: &Error) {
    if err.is_infrastructure() {
        error!(operation, %scope, ?category_id, error = %err, "category operation failed");
    } else {
        warn!(operation, %scope, ?category_id, reason = %err, "category operation rejected");
    }
}

async fn find_in_scope<C>(
    db: &C,
    scope: CategoryScope,
    category_id: i64,
) -> Result<Option<category::Model>>
where
    C: ConnectionTrait,
{
    Category::find_by_id(category_id)
        .filter(scope.condition())
        .one(db)
        .await
        .map_err(Into::into)
}

async fn ensure_name_available<C>(
    db: &C,
    scope: CategoryScope,
    name: &str,
    exclude_id: Option<i64>,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut query = Category::find()
        .filter(scope.condition())
        .filter(category::Column::NameKey.eq(hierarchy::name_key(name)));
    if let Some(id) = exclude_id {
        query = query.filter(category::Column::Id.ne(id));
    }

    if query.count(db).await? > 0 {
        return Err(Error::validation(
            "name",
            format!("The category name '{name}' has already been taken."),
        ));
    }
    Ok(())
}

async fn next_seller_sequence<C>(db: &C, seller_id: i64) -> Result<i32>
where
    C: ConnectionTrait,
{
    let last = Category::find()
        .filter(category::Column::SellerId.eq(seller_id))
        .order_by_desc(category::Column::SellerSequence)
        .one(db)
        .await?;
    Ok(last.and_then(|c| c.seller_sequence).unwrap_or(0) + 1)
}

/// Finds a category by ID within `scope`.
///
/// Categories of other scopes are reported as absent.
pub async fn get_category(
    db: &DatabaseConnection,
    scope: CategoryScope,
    category_id: i64,
) -> Result<Option<category::Model>> {
    find_in_scope(db, scope, category_id).await
}

/// Finds a category by name within `scope`, ignoring case.
pub async fn get_category_by_name(
    db: &DatabaseConnection,
    scope: CategoryScope,
    name: &str,
) -> Result<Option<category::Model>> {
    Category::find()
        .filter(scope.condition())
        .filter(category::Column::NameKey.eq(hierarchy::name_key(name)))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all categories of `scope`, ordered alphabetically by name.
pub async fn list_categories(
    db: &DatabaseConnection,
    scope: CategoryScope,
) -> Result<Vec<category::Model>> {
    Category::find()
        .filter(scope.condition())
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the active categories of `scope`, ordered alphabetically by name.
///
/// This is the option list for parent pickers on the create form and for storefront menus.
pub async fn list_active_categories(
    db: &DatabaseConnection,
    scope: CategoryScope,
) -> Result<Vec<category::Model>> {
    Category::find()
        .filter(scope.condition())
        .filter(category::Column::IsActive.eq(true))
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the direct children of a category, ordered by name.
///
/// # Errors
/// Returns [`Error::NotFound`] if the category is not part of `scope`.
pub async fn list_children(
    db: &DatabaseConnection,
    scope: CategoryScope,
    category_id: i64,
) -> Result<Vec<category::Model>> {
    find_in_scope(db, scope, category_id)
        .await?
        .ok_or_else(|| not_found(category_id))?;

    Category::find()
        .filter(category::Column::ParentCategoryId.eq(category_id))
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Active categories that may become the parent of `category_id`.
///
/// Excludes the category itself and its whole subtree, so any option offered on the
/// edit form passes the cycle check.
///
/// # Errors
/// Returns [`Error::NotFound`] if the category is not part of `scope`.
pub async fn eligible_parents(
    db: &DatabaseConnection,
    scope: CategoryScope,
    category_id: i64,
) -> Result<Vec<category::Model>> {
    find_in_scope(db, scope, category_id)
        .await?
        .ok_or_else(|| not_found(category_id))?;

    let descendants = hierarchy::collect_descendants(db, category_id).await?;
    Ok(list_active_categories(db, scope)
        .await?
        .into_iter()
        .filter(|candidate| candidate.id != category_id && !descendants.contains(&candidate.id))
        .collect())
}

/// Parent chain of a category, root first (breadcrumb).
///
/// # Errors
/// Returns [`Error::NotFound`] if the category is not part of `scope`.
pub async fn ancestors(
    db: &DatabaseConnection,
    scope: CategoryScope,
    category_id: i64,
) -> Result<Vec<category::Model>> {
    let category = find_in_scope(db, scope, category_id)
        .await?
        .ok_or_else(|| not_found(category_id))?;
    hierarchy::ancestors_of(db, &category).await
}

/// Categories of `scope` as a forest, siblings ordered by name.
pub async fn category_tree(
    db: &DatabaseConnection,
    scope: CategoryScope,
    active_only: bool,
) -> Result<Vec<CategoryNode>> {
    let categories = if active_only {
        list_active_categories(db, scope).await?
    } else {
        list_categories(db, scope).await?
    };
    Ok(hierarchy::build_forest(categories))
}

/// Creates a category in `scope`.
///
/// Seller categories receive the next free seller-local sequence number. The category
/// starts active unless `input.is_active` says otherwise.
///
/// # Errors
/// - [`Error::Validation`] if the name is empty, too long or already used in `scope`
/// - [`Error::InvalidParent`] if the parent does not exist in `scope` or is inactive
/// - [`Error::Database`] if the store fails
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_category(
    db: &DatabaseConnection,
    scope: CategoryScope,
    input: CategoryInput,
) -> Result<category::Model> {
    create_in_scope(db, scope, input)
        .await
        .inspect(|created| info!(category_id = created.id, %scope, "category created"))
        .inspect_err(|e| log_rejection("create", scope, None, e))
}

async fn create_in_scope(
    db: &DatabaseConnection,
    scope: CategoryScope,
    input: CategoryInput,
) -> Result<category::Model> {
    let name = hierarchy::validate_name(&input.name)?;
    let description = hierarchy::normalize_description(input.description);

    let txn = begin_serializable(db).await?;

    ensure_name_available(&txn, scope, &name, None).await?;

    if let Some(parent_id) = input.parent_id {
        let parent = find_in_scope(&txn, scope, parent_id)
            .await?
            .ok_or(Error::InvalidParent { parent_id })?;
        hierarchy::ensure_parent_active(&parent)?;
    }

    let seller_sequence = match scope {
        CategoryScope::Seller(seller_id) => Some(next_seller_sequence(&txn, seller_id).await?),
        CategoryScope::Global => None,
    };

    let now = chrono::Utc::now().naive_utc();
    let category = category::ActiveModel {
        seller_id: Set(scope.seller_id()),
        seller_sequence: Set(seller_sequence),
        name_key: Set(hierarchy::name_key(&name)),
        name: Set(name),
        description: Set(description),
        is_active: Set(input.is_active.unwrap_or(true)),
        parent_category_id: Set(input.parent_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = category.insert(&txn).await?;

    txn.commit().await?;
    Ok(created)
}

/// Updates name, description, parent and optionally the active flag of a category.
///
/// The whole update is rejected, with nothing applied, when any guard fails. Children are
/// never written: deactivating a parent is only allowed once its children are inactive.
///
/// # Errors
/// - [`Error::Validation`] if the name is empty, too long or already used by another category
/// - [`Error::NotFound`] if the category or the requested parent is not in `scope`
/// - [`Error::CircularReference`] if the parent is the category itself or one of its descendants
/// - [`Error::InvalidParent`] if the requested parent is inactive
/// - [`Error::CascadeBlocked`] if deactivation is requested while active children exist
/// - [`Error::Database`] if the store fails
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn update_category(
    db: &DatabaseConnection,
    scope: CategoryScope,
    category_id: i64,
    input: CategoryInput,
) -> Result<category::Model> {
    update_in_scope(db, scope, category_id, input)
        .await
        .inspect(|_| info!(category_id, %scope, "category updated"))
        .inspect_err(|e| log_rejection("update", scope, Some(category_id), e))
}

async fn update_in_scope(
    db: &DatabaseConnection,
    scope: CategoryScope,
    category_id: i64,
    input: CategoryInput,
) -> Result<category::Model> {
    let name = hierarchy::validate_name(&input.name)?;
    let description = hierarchy::normalize_description(input.description);

    let txn = begin_serializable(db).await?;

    let current = find_in_scope(&txn, scope, category_id)
        .await?
        .ok_or_else(|| not_found(category_id))?;

    ensure_name_available(&txn, scope, &name, Some(category_id)).await?;

    let parent = match input.parent_id {
        Some(parent_id) => {
            hierarchy::ensure_not_self_parent(category_id, parent_id)?;
            let parent = find_in_scope(&txn, scope, parent_id)
                .await?
                .ok_or(Error::NotFound {
                    entity: "parent category",
                    id: parent_id,
                })?;
            let descendants = hierarchy::collect_descendants(&txn, category_id).await?;
            hierarchy::ensure_parent_not_descendant(category_id, parent_id, &descendants)?;
            hierarchy::ensure_parent_active(&parent)?;
            Some(parent)
        }
        None => None,
    };

    let is_active = input.is_active.unwrap_or(current.is_active);
    if current.is_active && !is_active {
        let active_children = hierarchy::count_active_children(&txn, category_id).await?;
        hierarchy::ensure_can_deactivate(active_children)?;
    } else if !current.is_active && is_active {
        hierarchy::ensure_can_activate(parent.as_ref())?;
    }

    let mut category: category::ActiveModel = current.into();
    category.name_key = Set(hierarchy::name_key(&name));
    category.name = Set(name);
    category.description = Set(description);
    category.parent_category_id = Set(input.parent_id);
    category.is_active = Set(is_active);
    category.updated_at = Set(chrono::Utc::now().naive_utc());
    let updated = category.update(&txn).await?;

    txn.commit().await?;
    Ok(updated)
}

/// Flips the active flag of a category.
///
/// Deactivation requires every direct child to be inactive. Only immediate children
/// are checked. Activation requires the parent, if any, to be active.
///
/// # Errors
/// - [`Error::NotFound`] if the category is not in `scope`
/// - [`Error::CascadeBlocked`] with [`ActiveChildren`](crate::errors::CascadeBlock::ActiveChildren)
///   or [`InactiveParent`](crate::errors::CascadeBlock::InactiveParent)
/// - [`Error::Database`] if the store fails
#[instrument(skip(db))]
pub async fn toggle_status(
    db: &DatabaseConnection,
    scope: CategoryScope,
    category_id: i64,
) -> Result<StatusChange> {
    toggle_in_scope(db, scope, category_id)
        .await
        .inspect(|change| info!(category_id, %scope, "category {}", change.verb()))
        .inspect_err(|e| log_rejection("toggle_status", scope, Some(category_id), e))
}

async fn toggle_in_scope(
    db: &DatabaseConnection,
    scope: CategoryScope,
    category_id: i64,
) -> Result<StatusChange> {
    let txn = begin_serializable(db).await?;

    let current = find_in_scope(&txn, scope, category_id)
        .await?
        .ok_or_else(|| not_found(category_id))?;

    if current.is_active {
        let active_children = hierarchy::count_active_children(&txn, category_id).await?;
        hierarchy::ensure_can_deactivate(active_children)?;
    } else {
        let parent = match current.parent_category_id {
            Some(parent_id) => Category::find_by_id(parent_id).one(&txn).await?,
            None => None,
        };
        hierarchy::ensure_can_activate(parent.as_ref())?;
    }

    let is_active = !current.is_active;
    let mut category: category::ActiveModel = current.into();
    category.is_active = Set(is_active);
    category.updated_at = Set(chrono::Utc::now().naive_utc());
    let updated = category.update(&txn).await?;

    txn.commit().await?;
    Ok(StatusChange { category: updated })
}

/// Hard deletes a leaf category and returns the removed row.
///
/// Any child row blocks deletion, whatever its active flag. Live products also block
/// it. Soft-deleted products in the category are removed along with it.
///
/// # Errors
/// - [`Error::NotFound`] if the category is not in `scope`
/// - [`Error::CascadeBlocked`] with [`HasChildren`](crate::errors::CascadeBlock::HasChildren)
///   or [`HasProducts`](crate::errors::CascadeBlock::HasProducts)
/// - [`Error::Database`] if the store fails
#[instrument(skip(db))]
pub async fn delete_category(
    db: &DatabaseConnection,
    scope: CategoryScope,
    category_id: i64,
) -> Result<category::Model> {
    delete_in_scope(db, scope, category_id)
        .await
        .inspect(|_| info!(category_id, %scope, "category deleted"))
        .inspect_err(|e| log_rejection("delete", scope, Some(category_id), e))
}

async fn delete_in_scope(
    db: &DatabaseConnection,
    scope: CategoryScope,
    category_id: i64,
) -> Result<category::Model> {
    let txn = begin_serializable(db).await?;

    let current = find_in_scope(&txn, scope, category_id)
        .await?
        .ok_or_else(|| not_found(category_id))?;

    let children = hierarchy::count_children(&txn, category_id).await?;
    hierarchy::ensure_leaf(children)?;

    let live_products = product::count_live_products(&txn, category_id).await?;
    hierarchy::ensure_no_products(live_products)?;

    product::purge_deleted_products(&txn, category_id).await?;
    Category::delete_by_id(category_id).exec(&txn).await?;

    txn.commit().await?;
    Ok(current)
}
