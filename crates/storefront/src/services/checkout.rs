//! Checkout service: recording purchases.

use sqlx::PgPool;
use thiserror::Error;

use shopkeep_core::{ProductId, ShippingAddress, ValidationError};

use super::catalog::{CatalogError, CatalogService};
use crate::db::{PurchaseRepository, RepositoryError};
use crate::models::{Purchase, User};

/// Errors from checkout operations.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Raw checkout form input.
#[derive(Debug, Clone, Copy)]
pub struct AddressInput<'a> {
    pub street_1: &'a str,
    pub street_2: &'a str,
    pub city: &'a str,
    pub state: &'a str,
    pub zip: &'a str,
}

impl AddressInput<'_> {
    fn parse(self) -> Result<ShippingAddress, ValidationError> {
        ShippingAddress::parse(
            self.street_1,
            self.street_2,
            self.city,
            self.state,
            self.zip,
        )
    }
}

/// Checkout service.
pub struct CheckoutService<'a> {
    catalog: CatalogService<'a>,
    purchases: PurchaseRepository<'a>,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            catalog: CatalogService::new(pool),
            purchases: PurchaseRepository::new(pool),
        }
    }

    /// Record a purchase of `product_id` by `actor`.
    ///
    /// The product must exist; sellers may buy their own products.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Catalog` if the product does not exist.
    /// Returns `CheckoutError::Validation` for the first empty address field.
    pub async fn create_purchase(
        &self,
        product_id: ProductId,
        address: AddressInput<'_>,
        actor: &User,
    ) -> Result<Purchase, CheckoutError> {
        let product = self.catalog.get_product_for_view(product_id).await?;
        let address = address.parse()?;

        let purchase = self
            .purchases
            .create(product.id, actor.id, &address)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(message) => {
                    CheckoutError::Catalog(CatalogError::Conflict(message))
                }
                other => CheckoutError::Repository(other),
            })?;

        tracing::info!(
            purchase_id = %purchase.id,
            product_id = %product.id,
            buyer_id = %actor.id,
            "Purchase recorded"
        );
        Ok(purchase)
    }
}
