//! Shopkeep Core - Shared types library.
//!
//! This crate provides common types used across all Shopkeep components:
//! - `storefront` - The web application (accounts, catalog, checkout)
//! - `cli` - Command-line tools for migrations and demo data
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids and prices, shipping addresses, and
//!   required-field validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
