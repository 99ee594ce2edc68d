//! Purchase repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shopkeep_core::{ProductId, PurchaseId, ShippingAddress, UserId};

use super::{ConflictOn, RepositoryError, write_error};
use crate::models::Purchase;

#[derive(Debug, sqlx::FromRow)]
struct PurchaseRow {
    id: PurchaseId,
    product_id: ProductId,
    buyer_id: UserId,
    street_1: String,
    street_2: Option<String>,
    city: String,
    state: String,
    zip: String,
    created_at: DateTime<Utc>,
}

impl From<PurchaseRow> for Purchase {
    fn from(row: PurchaseRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            buyer_id: row.buyer_id,
            address: ShippingAddress {
                street_1: row.street_1,
                street_2: row.street_2,
                city: row.city,
                state: row.state,
                zip: row.zip,
            },
            created_at: row.created_at,
        }
    }
}

/// Repository for purchase database operations.
pub struct PurchaseRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PurchaseRepository<'a> {
    /// Create a new purchase repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a purchase of `product` by `buyer`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product or buyer no longer exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        product: ProductId,
        buyer: UserId,
        address: &ShippingAddress,
    ) -> Result<Purchase, RepositoryError> {
        let row = sqlx::query_as::<_, PurchaseRow>(
            r"
            INSERT INTO purchases (product_id, buyer_id, street_1, street_2, city, state, zip)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, product_id, buyer_id, street_1, street_2, city, state, zip, created_at
            ",
        )
        .bind(product)
        .bind(buyer)
        .bind(&address.street_1)
        .bind(address.street_2.as_deref())
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.zip)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            write_error(
                e,
                ConflictOn::ForeignKey,
                format!("Product id {product} is no longer available."),
            )
        })?;

        Ok(row.into())
    }

    /// Count all purchases.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM purchases")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
