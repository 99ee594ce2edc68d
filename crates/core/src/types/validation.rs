//! Required-field validation for form input.
//!
//! Forms are checked field by field in a fixed order and the first failure
//! wins; errors are never accumulated.

use crate::PriceError;

/// A user-correctable problem with submitted form data.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was empty.
    #[error("{label} is required.")]
    Required {
        /// Human-readable field label, e.g. `"First Name"`.
        label: &'static str,
    },
    /// The price field could not be parsed.
    #[error(transparent)]
    Price(#[from] PriceError),
}

impl ValidationError {
    /// Shorthand for a missing required field.
    #[must_use]
    pub const fn required(label: &'static str) -> Self {
        Self::Required { label }
    }
}

/// Check that every field is non-empty, in order.
///
/// Each entry is a `(label, value)` pair. Values are checked as submitted;
/// whitespace-only input counts as present.
///
/// # Errors
///
/// Returns [`ValidationError::Required`] for the first empty field.
///
/// # Example
///
/// ```
/// use shopkeep_core::{ValidationError, require};
///
/// let result = require(&[("Email", "a@b.c"), ("Password", ""), ("First Name", "")]);
/// assert_eq!(result, Err(ValidationError::required("Password")));
/// ```
pub fn require(fields: &[(&'static str, &str)]) -> Result<(), ValidationError> {
    match fields.iter().find(|(_, value)| value.is_empty()) {
        Some(&(label, _)) => Err(ValidationError::required(label)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_present() {
        assert_eq!(require(&[("Name", "n"), ("Description", "d")]), Ok(()));
        assert_eq!(require(&[]), Ok(()));
    }

    #[test]
    fn test_first_missing_wins() {
        let result = require(&[("Name", ""), ("Description", ""), ("Price", "")]);
        assert_eq!(result, Err(ValidationError::required("Name")));
    }

    #[test]
    fn test_whitespace_counts_as_present() {
        assert_eq!(require(&[("Name", " ")]), Ok(()));
    }

    #[test]
    fn test_message() {
        assert_eq!(
            ValidationError::required("Last Name").to_string(),
            "Last Name is required."
        );
        assert_eq!(
            ValidationError::from(PriceError::Negative).to_string(),
            "Price cannot be negative."
        );
    }
}
