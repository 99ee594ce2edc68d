//! CLI command implementations.

pub mod migrate;
pub mod seed;

use sqlx::PgPool;

use shopkeep_storefront::{config, db};

/// Connect to the storefront database named by the environment.
///
/// # Errors
///
/// Returns an error if the URL is missing or the connection fails.
pub async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    let database_url = config::database_url_from_env()?;

    tracing::info!("Connecting to storefront database...");
    Ok(db::create_pool(&database_url).await?)
}
