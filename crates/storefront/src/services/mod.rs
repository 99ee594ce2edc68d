//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Registration and password login
//! - `catalog` - Product listing and seller-only edits
//! - `checkout` - Purchase recording

pub mod auth;
pub mod catalog;
pub mod checkout;

pub use auth::{AuthError, AuthService};
pub use catalog::{CatalogError, CatalogService, OwnedProduct};
pub use checkout::{CheckoutError, CheckoutService};
