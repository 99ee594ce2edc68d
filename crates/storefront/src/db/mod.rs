//! Database operations for storefront `PostgreSQL`.
//!
//! ## Tables
//!
//! - `users` - Registered accounts (unique email, argon2 password hash)
//! - `products` - Listings owned by a seller (unique name)
//! - `purchases` - Append-only purchase records with shipping address
//! - `tower_sessions.session` - Session storage (created by the session store)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/`, embedded in
//! [`MIGRATOR`], and run via:
//! ```bash
//! cargo run -p shopkeep-cli -- migrate
//! ```

pub mod products;
pub mod purchases;
pub mod seed;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use products::ProductRepository;
pub use purchases::PurchaseRepository;
pub use users::UserRepository;

/// Embedded storefront schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (unique email or name, dangling reference).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Which constraint violations a write should report as conflicts.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ConflictOn {
    /// A `UNIQUE` constraint.
    Unique,
    /// A `FOREIGN KEY` constraint.
    ForeignKey,
}

/// Map a failed write to `RepositoryError::Conflict` when it violated the
/// given kind of constraint.
pub(crate) fn write_error(e: sqlx::Error, on: ConflictOn, message: String) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e {
        let violated = match on {
            ConflictOn::Unique => db_err.is_unique_violation(),
            ConflictOn::ForeignKey => db_err.is_foreign_key_violation(),
        };
        if violated {
            return RepositoryError::Conflict(message);
        }
    }
    RepositoryError::Database(e)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
