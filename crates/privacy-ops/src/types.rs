//! Request and response payloads for the privacy-request service API.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Responses
// =============================================================================

/// `POST /api/v1/oauth/token` response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
}

/// `POST /api/v1/oauth/client` response.
#[derive(Debug, Deserialize)]
pub struct ClientCredentials {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
}

/// Bulk create-or-update response used by most `PATCH` endpoints.
#[derive(Debug, Deserialize)]
pub struct BulkResponse {
    #[serde(default)]
    pub succeeded: Vec<Value>,
    #[serde(default)]
    pub failed: Vec<Value>,
}

/// `PUT /api/v1/connection/{key}/secret` response.
#[derive(Debug, Deserialize)]
pub struct ConnectionTestResponse {
    pub test_status: Option<String>,
    pub msg: Option<String>,
}

/// `PUT /api/v1/connection/{key}/validate_dataset` response.
#[derive(Debug, Deserialize)]
pub struct ValidateDatasetResponse {
    pub traversal_details: TraversalDetails,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TraversalDetails {
    pub is_traversable: bool,
    pub msg: Option<String>,
}

/// Error body shape returned with 4xx statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub detail: Value,
}

// =============================================================================
// Requests
// =============================================================================

/// Form body for `POST /api/v1/oauth/token`.
#[derive(Debug, Serialize)]
pub struct TokenRequest<'a> {
    pub grant_type: &'static str,
    pub client_id: &'a str,
    pub client_secret: &'a str,
}

#[derive(Debug, Serialize)]
pub struct UserCreate<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ConnectionCreate<'a> {
    pub name: &'a str,
    pub key: &'a str,
    pub connection_type: &'static str,
    pub access: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ConnectionSecrets<'a> {
    pub host: &'a str,
    pub port: u16,
    pub dbname: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct StorageCreate<'a> {
    pub name: &'a str,
    pub key: &'a str,
    #[serde(rename = "type")]
    pub storage_type: &'static str,
    pub format: &'a str,
    pub details: StorageDetails,
}

#[derive(Debug, Serialize)]
pub struct StorageDetails {
    pub naming: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PolicyCreate<'a> {
    pub name: &'a str,
    pub key: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RuleCreate<'a> {
    pub name: &'a str,
    pub key: &'a str,
    pub action_type: ActionType,
    pub storage_destination_key: Option<&'a str>,
    pub masking_strategy: Option<MaskingStrategy>,
}

#[derive(Debug, Serialize)]
pub struct RuleTarget<'a> {
    pub data_category: &'a str,
}

#[derive(Debug, Serialize)]
pub struct PrivacyRequestCreate<'a> {
    pub requested_at: String,
    pub policy_key: &'a str,
    pub identity: Identity<'a>,
}

#[derive(Debug, Serialize)]
pub struct Identity<'a> {
    pub email: &'a str,
}

/// What a policy rule does with matched data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Access,
    Erasure,
}

impl ActionType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Erasure => "erasure",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized action type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action type {0:?} (expected access or erasure)")]
pub struct UnknownActionType(pub String);

impl FromStr for ActionType {
    type Err = UnknownActionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "access" => Ok(Self::Access),
            "erasure" => Ok(Self::Erasure),
            _ => Err(UnknownActionType(s.to_string())),
        }
    }
}

/// Masking applied by erasure rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaskingStrategy {
    pub strategy: &'static str,
    pub configuration: serde_json::Map<String, Value>,
}

impl MaskingStrategy {
    /// HMAC masking with the service's default configuration.
    #[must_use]
    pub fn hmac() -> Self {
        Self {
            strategy: "hmac",
            configuration: serde_json::Map::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_action_type_parse() {
        assert_eq!("access".parse::<ActionType>().unwrap(), ActionType::Access);
        assert_eq!(" Erasure ".parse::<ActionType>().unwrap(), ActionType::Erasure);
        assert!("delete".parse::<ActionType>().is_err());
    }

    #[test]
    fn test_erasure_rule_body() {
        let rule = RuleCreate {
            name: "default_erasure_rule",
            key: "default_erasure_rule",
            action_type: ActionType::Erasure,
            storage_destination_key: None,
            masking_strategy: Some(MaskingStrategy::hmac()),
        };

        assert_eq!(
            serde_json::to_value(&rule).unwrap(),
            json!({
                "name": "default_erasure_rule",
                "key": "default_erasure_rule",
                "action_type": "erasure",
                "storage_destination_key": null,
                "masking_strategy": {"strategy": "hmac", "configuration": {}},
            })
        );
    }

    #[test]
    fn test_storage_body_uses_type_key() {
        let storage = StorageCreate {
            name: "default_storage",
            key: "default_storage",
            storage_type: "local",
            format: "json",
            details: StorageDetails {
                naming: "request_id",
            },
        };
        let value = serde_json::to_value(&storage).unwrap();
        assert_eq!(value["type"], "local");
        assert_eq!(value["details"]["naming"], "request_id");
    }

    #[test]
    fn test_bulk_response_defaults() {
        let response: BulkResponse = serde_json::from_value(json!({"failed": []})).unwrap();
        assert!(response.succeeded.is_empty());
    }
}
