//! User domain types.

use chrono::{DateTime, Utc};

use shopkeep_core::UserId;

/// A registered storefront user (domain type).
///
/// Users are created at registration and never modified afterwards. The
/// password hash is deliberately absent; it is only read during login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Email address (unique).
    pub email: String,
    /// Given name, shown next to the user's listings.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}
