//! Core business logic - framework-agnostic category and product operations.

/// Category create, update, status toggle, delete and read operations
pub mod category;
/// Descendant collection, cascade guards and tree assembly
pub mod hierarchy;
/// Products listed under categories
pub mod product;
/// Global versus seller-owned category namespaces
pub mod scope;
/// Idempotent seeding of a catalogue from configuration
pub mod seed;

pub use scope::CategoryScope;

use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, DatabaseTransaction, IsolationLevel,
    TransactionTrait,
};

/// Opens the transaction every guarded write runs in.
///
/// `SQLite` transactions are already serializable and the driver only warns about an
/// explicit isolation level, so the level is requested on other backends alone.
pub(crate) async fn begin_serializable(db: &DatabaseConnection) -> Result<DatabaseTransaction> {
    let txn = match db.get_database_backend() {
        DatabaseBackend::Sqlite => db.begin().await?,
        _ => {
            db.begin_with_config(Some(IsolationLevel::Serializable), None)
                .await?
        }
    };
    Ok(txn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_begin_serializable_on_sqlite() -> Result<()> {
        let db = setup_test_db().await?;
        let txn = begin_serializable(&db).await?;
        txn.commit().await?;
        Ok(())
    }
}
