//! Shipping address captured at checkout.

use serde::{Deserialize, Serialize};

use crate::{ValidationError, require};

/// A validated shipping address.
///
/// Street line 2 is optional; every other line is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub street_1: String,
    pub street_2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl ShippingAddress {
    /// Validate raw form input.
    ///
    /// Fields are checked in the order street, city, state, zip. An empty
    /// `street_2` becomes `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Required`] naming the first empty field.
    pub fn parse(
        street_1: &str,
        street_2: &str,
        city: &str,
        state: &str,
        zip: &str,
    ) -> Result<Self, ValidationError> {
        require(&[
            ("Street", street_1),
            ("City", city),
            ("State", state),
            ("Zip", zip),
        ])?;

        Ok(Self {
            street_1: street_1.to_owned(),
            street_2: (!street_2.is_empty()).then(|| street_2.to_owned()),
            city: city.to_owned(),
            state: state.to_owned(),
            zip: zip.to_owned(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let address =
            ShippingAddress::parse("234 Example St", "", "Exampleville", "NY", "23456").unwrap();
        assert_eq!(address.street_1, "234 Example St");
        assert_eq!(address.street_2, None);
        assert_eq!(address.zip, "23456");
    }

    #[test]
    fn test_parse_keeps_street_2() {
        let address = ShippingAddress::parse("1 Main", "Apt 2", "Town", "NY", "1").unwrap();
        assert_eq!(address.street_2.as_deref(), Some("Apt 2"));
    }

    #[test]
    fn test_street_checked_first() {
        let err = ShippingAddress::parse("", "", "", "", "").unwrap_err();
        assert_eq!(err.to_string(), "Street is required.");
    }

    #[test]
    fn test_field_order() {
        let err = ShippingAddress::parse("1 Main", "", "", "", "").unwrap_err();
        assert_eq!(err, ValidationError::required("City"));

        let err = ShippingAddress::parse("1 Main", "", "Town", "", "").unwrap_err();
        assert_eq!(err, ValidationError::required("State"));

        let err = ShippingAddress::parse("1 Main", "", "Town", "NY", "").unwrap_err();
        assert_eq!(err, ValidationError::required("Zip"));
    }
}
