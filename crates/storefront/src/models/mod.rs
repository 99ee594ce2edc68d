//! Domain models for storefront.

pub mod product;
pub mod purchase;
pub mod session;
pub mod user;

pub use product::{ProductDraft, ProductListing};
pub use purchase::Purchase;
pub use session::keys as session_keys;
pub use user::User;
