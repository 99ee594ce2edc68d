//! Product domain types.

use chrono::{DateTime, Utc};

use shopkeep_core::{Price, ProductId, UserId, ValidationError, require};

/// A product as shown in the catalog, joined with its seller's first name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductListing {
    pub id: ProductId,
    pub seller_id: UserId,
    pub seller_first_name: String,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub created_at: DateTime<Utc>,
}

impl ProductListing {
    /// Whether `user` is the seller of this listing.
    #[must_use]
    pub fn is_sold_by(&self, user: UserId) -> bool {
        self.seller_id == user
    }
}

/// Validated product fields for a create or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Price,
}

impl ProductDraft {
    /// Validate raw form input.
    ///
    /// Checks name, description, and price for presence in that order, then
    /// parses the price.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered.
    pub fn parse(name: &str, description: &str, price: &str) -> Result<Self, ValidationError> {
        require(&[("Name", name), ("Description", description), ("Price", price)])?;

        Ok(Self {
            name: name.to_owned(),
            description: description.to_owned(),
            price: Price::parse(price)?,
        })
    }
}
