use dotenvy::dotenv;
use farm_market::{
    config::{catalog, database},
    core::{CategoryScope, category, hierarchy, seed},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 4. Seed the global catalogue when a catalogue file is present
    let catalog_path = catalog::get_catalog_path();
    if catalog_path.exists() {
        let catalog = catalog::load_config(&catalog_path)?;
        seed::seed_categories(&db, CategoryScope::Global, &catalog)
            .await
            .inspect_err(|e| error!("Failed to seed categories: {}", e))?;
    } else {
        info!("No catalogue at {}, skipping seed.", catalog_path.display());
    }

    // 5. Report the current global tree
    let tree = category::category_tree(&db, CategoryScope::Global, false).await?;
    info!(
        "Global category tree:\n{}",
        hierarchy::format_forest(&tree)
    );

    Ok(())
}
