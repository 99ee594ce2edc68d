//! Database migration command.
//!
//! Applies the embedded storefront migrations (`crates/storefront/migrations/`)
//! and creates the session store table.

use sqlx::PgPool;
use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;

use shopkeep_storefront::db::MIGRATOR;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Session store migration error: {0}")]
    SessionStore(#[from] sqlx::Error),
}

/// Run storefront and session store migrations.
///
/// # Errors
///
/// Returns `MigrationError` if either migration fails.
pub async fn run(pool: &PgPool) -> Result<(), MigrationError> {
    tracing::info!("Running storefront migrations...");
    MIGRATOR.run(pool).await?;

    tracing::info!("Running session store migration...");
    PostgresStore::new(pool.clone()).migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
