//! Purchase domain types.

use chrono::{DateTime, Utc};

use shopkeep_core::{ProductId, PurchaseId, ShippingAddress, UserId};

/// A recorded purchase of a product by a buyer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purchase {
    pub id: PurchaseId,
    pub product_id: ProductId,
    pub buyer_id: UserId,
    pub address: ShippingAddress,
    pub created_at: DateTime<Utc>,
}
