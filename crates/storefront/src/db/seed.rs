//! Demo data for local development.
//!
//! Two users, three products, and one purchase. Passwords are hashed when
//! the seed runs.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use crate::services::auth::{AuthError, hash_password};

/// Errors that can occur while loading demo data.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] AuthError),

    #[error("invalid seed timestamp")]
    Timestamp,
}

struct SeedUser {
    email: &'static str,
    password: &'static str,
    first_name: &'static str,
    last_name: &'static str,
}

const USERS: [SeedUser; 2] = [
    SeedUser {
        email: "admin@example.com",
        password: "admin",
        first_name: "Admin",
        last_name: "User",
    },
    SeedUser {
        email: "user@example.com",
        password: "user",
        first_name: "Example",
        last_name: "User",
    },
];

/// (seller index into `USERS`, product number, price in cents, day of January 2020)
const PRODUCTS: [(usize, u32, i64, u32); 3] = [(0, 1, 1000, 1), (0, 2, 2000, 2), (1, 3, 5000, 3)];

/// Summary of what was inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub products: usize,
    pub purchases: usize,
}

fn jan_2020(day: u32) -> Result<DateTime<Utc>, SeedError> {
    Utc.with_ymd_and_hms(2020, 1, day, 12, 0, 0)
        .single()
        .ok_or(SeedError::Timestamp)
}

/// Insert the demo users, products, and purchase in one transaction.
///
/// Expects empty tables; a rerun fails on the unique email constraint.
///
/// # Errors
///
/// Returns `SeedError` if hashing or any insert fails.
#[allow(clippy::indexing_slicing)] // indices come from the const tables above
pub async fn seed_demo_data(pool: &PgPool) -> Result<SeedSummary, SeedError> {
    let mut tx = pool.begin().await?;

    let mut user_ids = Vec::with_capacity(USERS.len());
    for user in &USERS {
        let password_hash = hash_password(user.password)?;
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO users (email, password, first_name, last_name)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(user.email)
        .bind(&password_hash)
        .bind(user.first_name)
        .bind(user.last_name)
        .fetch_one(&mut *tx)
        .await?;
        user_ids.push(id);
    }

    let mut product_ids = Vec::with_capacity(PRODUCTS.len());
    for &(seller, number, cents, day) in &PRODUCTS {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO products (seller_id, name, description, price, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(user_ids[seller])
        .bind(format!("Example Product {number}"))
        .bind(format!("A description for example product #{number}"))
        .bind(Decimal::new(cents, 2))
        .bind(jan_2020(day)?)
        .fetch_one(&mut *tx)
        .await?;
        product_ids.push(id);
    }

    sqlx::query(
        r"
        INSERT INTO purchases (product_id, buyer_id, street_1, street_2, city, state, zip, created_at)
        VALUES ($1, $2, '123 Example St', 'Apt 123', 'Exampletown', 'NY', '12345', $3)
        ",
    )
    .bind(product_ids[0])
    .bind(user_ids[1])
    .bind(jan_2020(4)?)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        users = user_ids.len(),
        products = product_ids.len(),
        "Demo data seeded"
    );

    Ok(SeedSummary {
        users: user_ids.len(),
        products: product_ids.len(),
        purchases: 1,
    })
}

/// Remove all storefront rows and restart id sequences.
///
/// # Errors
///
/// Returns `SeedError::Database` if the truncate fails.
pub async fn reset(pool: &PgPool) -> Result<(), SeedError> {
    sqlx::query("TRUNCATE purchases, products, users RESTART IDENTITY CASCADE")
        .execute(pool)
        .await?;
    tracing::info!("Storefront tables cleared");
    Ok(())
}
