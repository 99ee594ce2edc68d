//! Core types for Shopkeep.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod id;
pub mod price;
pub mod validation;

pub use address::ShippingAddress;
pub use id::*;
pub use price::{Price, PriceError};
pub use validation::{ValidationError, require};
