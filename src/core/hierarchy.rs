//! Tree integrity logic for categories.
//!
//! The async helpers here only read: descendant collection, child counts and the
//! ancestor chain. They are generic over `ConnectionTrait` so the category operations
//! can run them inside their write transaction. The guard functions are pure and take
//! the facts they judge as plain arguments.

use crate::{
    entities::{Category, category},
    errors::{CascadeBlock, Error, Result},
};
use sea_orm::{PaginatorTrait, QuerySelect, prelude::*};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Longest accepted category name, in characters.
pub const NAME_MAX_CHARS: usize = 100;

/// Trims and checks a category name.
///
/// # Errors
/// Returns [`Error::Validation`] on the `name` field when the trimmed name is empty or
/// longer than [`NAME_MAX_CHARS`] characters.
pub fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("name", "The category name is required."));
    }
    if trimmed.chars().count() > NAME_MAX_CHARS {
        return Err(Error::validation(
            "name",
            format!("The category name may not be greater than {NAME_MAX_CHARS} characters."),
        ));
    }
    Ok(trimmed.to_string())
}

/// Comparison key for scoped name uniqueness: trimmed and lowercased.
///
/// Folding happens here rather than in SQL, because `SQLite`'s `LOWER` leaves non-ASCII
/// letters untouched.
#[must_use]
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Trims a description, treating blank text as absent.
#[must_use]
pub fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Rejects a category naming itself as parent.
pub fn ensure_not_self_parent(category_id: i64, parent_id: i64) -> Result<()> {
    if category_id == parent_id {
        return Err(Error::CircularReference {
            category_id,
            parent_id,
        });
    }
    Ok(())
}

/// Rejects a parent found among the category's descendants.
pub fn ensure_parent_not_descendant(
    category_id: i64,
    parent_id: i64,
    descendants: &BTreeSet<i64>,
) -> Result<()> {
    if descendants.contains(&parent_id) {
        return Err(Error::CircularReference {
            category_id,
            parent_id,
        });
    }
    Ok(())
}

/// Rejects an inactive parent.
pub fn ensure_parent_active(parent: &category::Model) -> Result<()> {
    if !parent.is_active {
        return Err(Error::InvalidParent {
            parent_id: parent.id,
        });
    }
    Ok(())
}

/// Active → inactive requires no active direct children.
pub const fn ensure_can_deactivate(active_children: u64) -> Result<()> {
    if active_children > 0 {
        return Err(Error::CascadeBlocked(CascadeBlock::ActiveChildren {
            count: active_children,
        }));
    }
    Ok(())
}

/// Inactive → active requires the parent, if any, to be active.
pub fn ensure_can_activate(parent: Option<&category::Model>) -> Result<()> {
    match parent {
        Some(parent) if !parent.is_active => {
            Err(Error::CascadeBlocked(CascadeBlock::InactiveParent {
                parent_id: parent.id,
            }))
        }
        _ => Ok(()),
    }
}

/// Only leaf categories may be deleted.
pub const fn ensure_leaf(child_count: u64) -> Result<()> {
    if child_count > 0 {
        return Err(Error::CascadeBlocked(CascadeBlock::HasChildren {
            count: child_count,
        }));
    }
    Ok(())
}

/// A category that still lists products may not be deleted.
pub const fn ensure_no_products(product_count: u64) -> Result<()> {
    if product_count > 0 {
        return Err(Error::CascadeBlocked(CascadeBlock::HasProducts {
            count: product_count,
        }));
    }
    Ok(())
}

/// Collects every category reachable downwards from `category_id`.
///
/// Uses a worklist: each round fetches the children of the whole frontier in one query,
/// and ids already seen are never expanded again, so the walk terminates even if the
/// stored data were to contain a loop. The starting category is never part of the result.
pub async fn collect_descendants<C>(db: &C, category_id: i64) -> Result<BTreeSet<i64>>
where
    C: ConnectionTrait,
{
    let mut descendants = BTreeSet::new();
    let mut frontier = vec![category_id];

    while !frontier.is_empty() {
        let children: Vec<i64> = Category::find()
            .select_only()
            .column(category::Column::Id)
            .filter(category::Column::ParentCategoryId.is_in(frontier.iter().copied()))
            .into_tuple()
            .all(db)
            .await?;

        frontier = children
            .into_iter()
            .filter(|id| *id != category_id && descendants.insert(*id))
            .collect();
    }

    Ok(descendants)
}

/// Number of categories naming `category_id` as parent, whatever their state.
pub async fn count_children<C>(db: &C, category_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    Category::find()
        .filter(category::Column::ParentCategoryId.eq(category_id))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Number of active categories naming `category_id` as parent.
pub async fn count_active_children<C>(db: &C, category_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    Category::find()
        .filter(category::Column::ParentCategoryId.eq(category_id))
        .filter(category::Column::IsActive.eq(true))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Walks the parent links upwards and returns the chain root-first, excluding `category`.
pub async fn ancestors_of<C>(db: &C, category: &category::Model) -> Result<Vec<category::Model>>
where
    C: ConnectionTrait,
{
    let mut chain = Vec::new();
    let mut seen = HashSet::from([category.id]);
    let mut next = category.parent_category_id;

    while let Some(parent_id) = next {
        if !seen.insert(parent_id) {
            break;
        }
        let Some(parent) = Category::find_by_id(parent_id).one(db).await? else {
            break;
        };
        next = parent.parent_category_id;
        chain.push(parent);
    }

    chain.reverse();
    Ok(chain)
}

/// A category with its sub-categories, for storefront menus and admin tree views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryNode {
    /// Category identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Active flag
    pub is_active: bool,
    /// Seller-local sequence number, if seller scoped
    pub seller_sequence: Option<i32>,
    /// Direct children, ordered by name
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CategoryNode>,
}

impl From<category::Model> for CategoryNode {
    fn from(model: category::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            is_active: model.is_active,
            seller_sequence: model.seller_sequence,
            children: Vec::new(),
        }
    }
}

/// Assembles a flat list of categories into a forest.
///
/// Rows whose parent is not part of `categories` become roots. Siblings keep the order
/// they had in the input, so callers sort before building.
#[must_use]
pub fn build_forest(categories: Vec<category::Model>) -> Vec<CategoryNode> {
    let ids: HashSet<i64> = categories.iter().map(|c| c.id).collect();
    let mut by_parent: HashMap<Option<i64>, Vec<category::Model>> = HashMap::new();

    for category in categories {
        let parent = category
            .parent_category_id
            .filter(|parent_id| ids.contains(parent_id));
        by_parent.entry(parent).or_default().push(category);
    }

    let roots = by_parent.remove(&None).unwrap_or_default();
    roots
        .into_iter()
        .map(|root| attach_children(root, &mut by_parent))
        .collect()
}

fn attach_children(
    model: category::Model,
    by_parent: &mut HashMap<Option<i64>, Vec<category::Model>>,
) -> CategoryNode {
    let children = by_parent.remove(&Some(model.id)).unwrap_or_default();
    let mut node = CategoryNode::from(model);
    node.children = children
        .into_iter()
        .map(|child| attach_children(child, by_parent))
        .collect();
    node
}

/// Renders a forest as indented lines, marking inactive categories.
#[must_use]
pub fn format_forest(forest: &[CategoryNode]) -> String {
    let mut out = String::new();
    let mut stack: Vec<(usize, &CategoryNode)> = forest.iter().rev().map(|n| (0, n)).collect();

    while let Some((depth, node)) = stack.pop() {
        out.push_str(&"  ".repeat(depth));
        out.push_str("- ");
        out.push_str(&node.name);
        if !node.is_active {
            out.push_str(" (inactive)");
        }
        out.push('\n');
        stack.extend(node.children.iter().rev().map(|child| (depth + 1, child)));
    }

    out
}
