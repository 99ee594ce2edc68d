//! Catalog service: product listing and seller-only edits.
//!
//! Edits go through [`OwnedProduct`], which can only be obtained from
//! [`CatalogService::get_product_for_owner`].

use sqlx::PgPool;
use thiserror::Error;

use shopkeep_core::{ProductId, ValidationError};

use crate::db::{ProductRepository, RepositoryError};
use crate::models::{ProductDraft, ProductListing, User};

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Product id {0} doesn't exist.")]
    NotFound(ProductId),

    #[error("Product id {0} belongs to another seller.")]
    Forbidden(ProductId),

    /// Unique name taken, or the product is still referenced by purchases.
    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for CatalogError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Conflict(message) => Self::Conflict(message),
            other => Self::Repository(other),
        }
    }
}

/// Raw product form input.
#[derive(Debug, Clone, Copy)]
pub struct ProductInput<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub price: &'a str,
}

impl ProductInput<'_> {
    fn parse(self) -> Result<ProductDraft, ValidationError> {
        ProductDraft::parse(self.name, self.description, self.price)
    }
}

/// A product the current actor has been verified to sell.
#[derive(Debug, Clone)]
pub struct OwnedProduct {
    listing: ProductListing,
}

impl OwnedProduct {
    #[must_use]
    pub const fn listing(&self) -> &ProductListing {
        &self.listing
    }

    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.listing.id
    }
}

/// Catalog service.
pub struct CatalogService<'a> {
    products: ProductRepository<'a>,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            products: ProductRepository::new(pool),
        }
    }

    /// All products with their seller's first name, newest first.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn list_products(&self) -> Result<Vec<ProductListing>, CatalogError> {
        Ok(self.products.list().await?)
    }

    /// Validate and insert a product sold by `actor`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` for the first empty or malformed field.
    /// Returns `CatalogError::Conflict` if the name is already taken.
    pub async fn create_product(
        &self,
        input: ProductInput<'_>,
        actor: &User,
    ) -> Result<ProductId, CatalogError> {
        let draft = input.parse()?;
        let id = self.products.create(actor.id, &draft).await?;

        tracing::info!(product_id = %id, seller_id = %actor.id, "Product created");
        Ok(id)
    }

    /// Fetch a product anyone may view.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no product has this id.
    pub async fn get_product_for_view(&self, id: ProductId) -> Result<ProductListing, CatalogError> {
        self.products
            .get(id)
            .await?
            .ok_or(CatalogError::NotFound(id))
    }

    /// Fetch a product and verify `actor` is its seller.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no product has this id.
    /// Returns `CatalogError::Forbidden` if `actor` is not the seller.
    pub async fn get_product_for_owner(
        &self,
        id: ProductId,
        actor: &User,
    ) -> Result<OwnedProduct, CatalogError> {
        let listing = self.get_product_for_view(id).await?;
        if !listing.is_sold_by(actor.id) {
            return Err(CatalogError::Forbidden(id));
        }
        Ok(OwnedProduct { listing })
    }

    /// Validate and overwrite an owned product's fields.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` for the first empty or malformed field.
    /// Returns `CatalogError::Conflict` if the new name is already taken.
    pub async fn update_product(
        &self,
        product: &OwnedProduct,
        input: ProductInput<'_>,
    ) -> Result<(), CatalogError> {
        let draft = input.parse()?;
        self.products
            .update(product.id(), &draft)
            .await
            .map_err(|e| not_found_as(e, product.id()))?;

        tracing::info!(product_id = %product.id(), "Product updated");
        Ok(())
    }

    /// Delete an owned product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Conflict` if purchases still reference the product.
    pub async fn delete_product(&self, product: OwnedProduct) -> Result<(), CatalogError> {
        self.products
            .delete(product.id())
            .await
            .map_err(|e| not_found_as(e, product.id()))?;

        tracing::info!(product_id = %product.id(), "Product deleted");
        Ok(())
    }
}

/// A row vanishing between the ownership check and the write reads as 404.
fn not_found_as(e: RepositoryError, id: ProductId) -> CatalogError {
    match e {
        RepositoryError::NotFound => CatalogError::NotFound(id),
        other => other.into(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_input_parse_checks_name_first() {
        let input = ProductInput {
            name: "",
            description: "",
            price: "",
        };
        assert_eq!(input.parse().unwrap_err().to_string(), "Name is required.");
    }

    #[test]
    fn test_repository_conflict_maps_to_conflict() {
        let err: CatalogError =
            RepositoryError::Conflict("A product named x already exists.".to_string()).into();
        assert!(matches!(err, CatalogError::Conflict(ref m) if m.contains("already exists")));
    }

    #[test]
    fn test_not_found_message() {
        let err = not_found_as(RepositoryError::NotFound, ProductId::new(4));
        assert_eq!(err.to_string(), "Product id 4 doesn't exist.");
    }
}
