//! Product repository for database operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use shopkeep_core::{Price, ProductId, UserId};

use super::{ConflictOn, RepositoryError, write_error};
use crate::models::{ProductDraft, ProductListing};

/// Internal row type for catalog queries (product joined with its seller).
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    seller_id: UserId,
    seller_first_name: String,
    name: String,
    description: String,
    price: Decimal,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for ProductListing {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::try_from(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("product {} price: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            seller_id: row.seller_id,
            seller_first_name: row.seller_first_name,
            name: row.name,
            description: row.description,
            price,
            created_at: row.created_at,
        })
    }
}

const SELECT_LISTING: &str = r"
    SELECT p.id, p.seller_id, u.first_name AS seller_first_name,
           p.name, p.description, p.price, p.created_at
    FROM products p
    JOIN users u ON u.id = p.seller_id
";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every product with its seller's first name, newest first.
    ///
    /// Ties on `created_at` are broken by descending id so the order is stable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<ProductListing>, RepositoryError> {
        let query = format!("{SELECT_LISTING} ORDER BY p.created_at DESC, p.id DESC");
        let rows = sqlx::query_as::<_, ProductRow>(&query)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(ProductListing::try_from).collect()
    }

    /// Get a single product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<ProductListing>, RepositoryError> {
        let query = format!("{SELECT_LISTING} WHERE p.id = $1");
        let row = sqlx::query_as::<_, ProductRow>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(ProductListing::try_from).transpose()
    }

    /// Insert a product owned by `seller`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is already taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        seller: UserId,
        draft: &ProductDraft,
    ) -> Result<ProductId, RepositoryError> {
        let id: ProductId = sqlx::query_scalar(
            r"
            INSERT INTO products (seller_id, name, description, price)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(seller)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price)
        .fetch_one(self.pool)
        .await
        .map_err(|e| name_taken(e, &draft.name))?;

        Ok(id)
    }

    /// Replace a product's name, description, and price.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row was updated.
    /// Returns `RepositoryError::Conflict` if the new name is already taken.
    pub async fn update(&self, id: ProductId, draft: &ProductDraft) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE products
            SET name = $2, description = $3, price = $4
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price)
        .execute(self.pool)
        .await
        .map_err(|e| name_taken(e, &draft.name))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row was deleted.
    /// Returns `RepositoryError::Conflict` if purchases still reference it.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                write_error(
                    e,
                    ConflictOn::ForeignKey,
                    "This product has purchases and cannot be deleted.".to_string(),
                )
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Count all products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

fn name_taken(e: sqlx::Error, name: &str) -> RepositoryError {
    write_error(
        e,
        ConflictOn::Unique,
        format!("A product named {name} already exists."),
    )
}
