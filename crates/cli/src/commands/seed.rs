//! Demo data commands.

use sqlx::PgPool;

use shopkeep_storefront::db::seed::{self, SeedError};

/// Load the demo users, products, and purchase.
///
/// # Errors
///
/// Returns `SeedError` if the tables are not empty or an insert fails.
pub async fn demo(pool: &PgPool) -> Result<(), SeedError> {
    let summary = seed::seed_demo_data(pool).await?;

    #[allow(clippy::print_stdout)]
    {
        println!(
            "Seeded {} users, {} products, {} purchases",
            summary.users, summary.products, summary.purchases
        );
        println!("  admin@example.com / admin");
        println!("  user@example.com / user");
    }
    Ok(())
}

/// Remove all storefront rows.
///
/// # Errors
///
/// Returns `SeedError::Database` if the truncate fails.
pub async fn reset(pool: &PgPool) -> Result<(), SeedError> {
    seed::reset(pool).await
}
