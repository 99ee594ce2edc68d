//! HTTP client for the privacy-request service REST API.
//!
//! Every call is a single request with no retry. Non-success statuses become
//! [`PrivacyOpsError::Api`] carrying the response body.

use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::config::DatabaseTarget;
use crate::error::{PrivacyOpsError, Result};
use crate::provision::StepOutcome;
use crate::types::{
    BulkResponse, ClientCredentials, ConnectionCreate, ConnectionSecrets, ConnectionTestResponse,
    ErrorDetail, Identity, PolicyCreate, PrivacyRequestCreate, RuleCreate, RuleTarget,
    StorageCreate, StorageDetails, TokenRequest, TokenResponse, TraversalDetails, UserCreate,
    ValidateDatasetResponse,
};

/// Detail the service returns when the operator account already exists.
const USERNAME_EXISTS: &str = "Username already exists.";

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Privacy-request service API client.
///
/// Holds the current bearer token; [`PrivacyOpsClient::login`] replaces it.
pub struct PrivacyOpsClient {
    http: reqwest::Client,
    base_url: Url,
    access_token: Option<SecretString>,
}

impl PrivacyOpsClient {
    /// Create a client for the service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(base_url: Url) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url,
            access_token: None,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.as_str().trim_end_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match &self.access_token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and decode a JSON success body.
    async fn send<T: DeserializeOwned>(
        operation: &'static str,
        builder: RequestBuilder,
    ) -> Result<T> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PrivacyOpsError::Api {
                operation,
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| PrivacyOpsError::UnexpectedResponse {
                operation,
                detail: e.to_string(),
            })
    }

    /// Send a bulk create-or-update and require at least one success.
    async fn bulk<B: Serialize + ?Sized>(
        &self,
        operation: &'static str,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<BulkResponse> {
        let response: BulkResponse =
            Self::send(operation, self.request(method, path).json(body)).await?;

        if response.succeeded.is_empty() {
            return Err(PrivacyOpsError::UnexpectedResponse {
                operation,
                detail: format!("nothing succeeded; failed={}", Value::from(response.failed)),
            });
        }
        Ok(response)
    }

    // =========================================================================
    // Health & OAuth
    // =========================================================================

    /// Check that the service answers `GET /health`. Any HTTP response counts.
    ///
    /// # Errors
    ///
    /// Returns `PrivacyOpsError::Http` if the request could not be sent.
    pub async fn health(&self) -> Result<()> {
        self.http.get(self.url("/health")).send().await?;
        Ok(())
    }

    /// Poll `/health` every `interval` until it answers or `timeout` passes.
    ///
    /// # Errors
    ///
    /// Returns `PrivacyOpsError::Unhealthy` when the deadline passes.
    pub async fn wait_until_healthy(&self, timeout: Duration, interval: Duration) -> Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            match self.health().await {
                Ok(()) => return Ok(()),
                Err(e) if tokio::time::Instant::now() + interval > deadline => {
                    tracing::warn!(error = %e, "Health check failed, giving up");
                    return Err(PrivacyOpsError::Unhealthy {
                        url: self.url("/health"),
                        seconds: timeout.as_secs(),
                    });
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Service not ready yet");
                    tokio::time::sleep(interval).await;
                }
            }
        }
    }

    /// Exchange a client id and secret for an access token and use it for
    /// subsequent requests.
    ///
    /// # Errors
    ///
    /// Returns `PrivacyOpsError::Api` on a non-success status, or
    /// `PrivacyOpsError::UnexpectedResponse` if the token is empty.
    pub async fn login(&mut self, client_id: &str, client_secret: &SecretString) -> Result<()> {
        const OPERATION: &str = "oauth login";

        let form = TokenRequest {
            grant_type: "client_credentials",
            client_id,
            client_secret: client_secret.expose_secret(),
        };
        let response: TokenResponse = Self::send(
            OPERATION,
            self.http.post(self.url("/api/v1/oauth/token")).form(&form),
        )
        .await?;

        if response.access_token.is_empty() {
            return Err(PrivacyOpsError::UnexpectedResponse {
                operation: OPERATION,
                detail: "empty access_token".to_string(),
            });
        }

        self.access_token = Some(SecretString::from(response.access_token));
        tracing::info!(client_id, "Completed oauth login via /api/v1/oauth/token");
        Ok(())
    }

    /// Create an OAuth client with the given scopes.
    ///
    /// # Errors
    ///
    /// Returns `PrivacyOpsError::UnexpectedResponse` if the id or secret is missing.
    pub async fn create_oauth_client(&self, scopes: &[&str]) -> Result<ClientCredentials> {
        const OPERATION: &str = "oauth client creation";

        let client: ClientCredentials = Self::send(
            OPERATION,
            self.request(Method::POST, "/api/v1/oauth/client").json(scopes),
        )
        .await?;

        if client.client_id.is_empty() || client.client_secret.is_empty() {
            return Err(PrivacyOpsError::UnexpectedResponse {
                operation: OPERATION,
                detail: "missing client_id or client_secret".to_string(),
            });
        }

        tracing::info!("Created oauth client via /api/v1/oauth/client");
        Ok(client)
    }

    // =========================================================================
    // Users, connections, datasets, storage
    // =========================================================================

    /// Create an operator account. An existing account is not an error.
    ///
    /// # Errors
    ///
    /// Returns `PrivacyOpsError::Api` for any failure other than "username exists".
    pub async fn create_user(&self, username: &str, password: &SecretString) -> Result<StepOutcome> {
        const OPERATION: &str = "user creation";

        let body = UserCreate {
            username,
            password: password.expose_secret(),
        };
        let response = self
            .request(Method::POST, "/api/v1/user")
            .json(&body)
            .send()
            .await?;
        let status = response.status();

        if status.is_success() {
            tracing::info!(username, "Created user via /api/v1/user");
            return Ok(StepOutcome::Created);
        }

        let text = response.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::BAD_REQUEST
            && serde_json::from_str::<ErrorDetail>(&text)
                .is_ok_and(|e| e.detail.as_str() == Some(USERNAME_EXISTS))
        {
            tracing::info!(username, "User already exists");
            return Ok(StepOutcome::AlreadyExists);
        }

        Err(PrivacyOpsError::Api {
            operation: OPERATION,
            status: status.as_u16(),
            body: text,
        })
    }

    /// Register a write-access postgres connection under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error on a non-success status or if nothing succeeded.
    pub async fn create_connection(&self, key: &str) -> Result<()> {
        let body = [ConnectionCreate {
            name: key,
            key,
            connection_type: "postgres",
            access: "write",
        }];
        self.bulk("connection creation", Method::PATCH, "/api/v1/connection", &body)
            .await?;

        tracing::info!(key, "Created connection via /api/v1/connection");
        Ok(())
    }

    /// Store database credentials for connection `key`. The service tests the
    /// connection when the secrets are saved.
    ///
    /// # Errors
    ///
    /// Returns `PrivacyOpsError::UnexpectedResponse` if the connection test failed.
    pub async fn configure_connection(&self, key: &str, database: &DatabaseTarget) -> Result<()> {
        const OPERATION: &str = "connection configuration";

        let body = ConnectionSecrets {
            host: &database.host,
            port: database.port,
            dbname: &database.dbname,
            username: &database.username,
            password: database.password.expose_secret(),
        };
        let path = format!("/api/v1/connection/{key}/secret");
        let response: ConnectionTestResponse =
            Self::send(OPERATION, self.request(Method::PUT, &path).json(&body)).await?;

        if response.test_status.as_deref() == Some("failed") {
            return Err(PrivacyOpsError::UnexpectedResponse {
                operation: OPERATION,
                detail: response
                    .msg
                    .unwrap_or_else(|| "connection test failed".to_string()),
            });
        }

        tracing::info!(key, "Configured connection secrets via {path}");
        Ok(())
    }

    /// Validate a dataset annotation against connection `key`.
    ///
    /// # Errors
    ///
    /// Returns `PrivacyOpsError::NotTraversable` if the graph cannot be walked.
    pub async fn validate_dataset(&self, key: &str, dataset: &Value) -> Result<TraversalDetails> {
        let path = format!("/api/v1/connection/{key}/validate_dataset");
        let response: ValidateDatasetResponse = Self::send(
            "dataset validation",
            self.request(Method::PUT, &path).json(dataset),
        )
        .await?;

        let details = response.traversal_details;
        if !details.is_traversable {
            return Err(PrivacyOpsError::NotTraversable(
                details.msg.unwrap_or_else(|| "no details".to_string()),
            ));
        }

        tracing::info!(key, "Validated dataset via {path}");
        Ok(details)
    }

    /// Create or replace the dataset annotation for connection `key`.
    ///
    /// # Errors
    ///
    /// Returns an error on a non-success status or if nothing succeeded.
    pub async fn put_dataset(&self, key: &str, dataset: &Value) -> Result<()> {
        let path = format!("/api/v1/connection/{key}/dataset");
        self.bulk("dataset creation", Method::PATCH, &path, std::slice::from_ref(dataset))
            .await?;

        tracing::info!(key, "Created dataset via {path}");
        Ok(())
    }

    /// Register a local storage destination that names files by request id.
    ///
    /// # Errors
    ///
    /// Returns an error on a non-success status or if nothing succeeded.
    pub async fn create_storage(&self, key: &str, format: &str) -> Result<()> {
        let body = [StorageCreate {
            name: key,
            key,
            storage_type: "local",
            format,
            details: StorageDetails {
                naming: "request_id",
            },
        }];
        self.bulk("storage creation", Method::PATCH, "/api/v1/storage/config", &body)
            .await?;

        tracing::info!(key, "Created storage via /api/v1/storage/config");
        Ok(())
    }

    // =========================================================================
    // Policies
    // =========================================================================

    /// Create or update a policy.
    ///
    /// # Errors
    ///
    /// Returns an error on a non-success status or if nothing succeeded.
    pub async fn create_policy(&self, key: &str) -> Result<()> {
        let body = [PolicyCreate { name: key, key }];
        self.bulk("policy creation", Method::PATCH, "/api/v1/policy", &body)
            .await?;

        tracing::info!(key, "Created policy via /api/v1/policy");
        Ok(())
    }

    /// Delete a policy rule.
    ///
    /// # Errors
    ///
    /// Returns `PrivacyOpsError::Api` on a non-success status (e.g. the rule
    /// does not exist yet).
    pub async fn delete_policy_rule(&self, policy_key: &str, rule_key: &str) -> Result<()> {
        let path = format!("/api/v1/policy/{policy_key}/rule/{rule_key}");
        let response = self.request(Method::DELETE, &path).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(PrivacyOpsError::Api {
                operation: "policy rule deletion",
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }

    /// Create or update a rule under `policy_key`.
    ///
    /// # Errors
    ///
    /// Returns an error on a non-success status or if nothing succeeded.
    pub async fn create_policy_rule(&self, policy_key: &str, rule: &RuleCreate<'_>) -> Result<()> {
        let path = format!("/api/v1/policy/{policy_key}/rule");
        self.bulk("policy rule creation", Method::PATCH, &path, std::slice::from_ref(rule))
            .await?;

        tracing::info!(policy_key, rule_key = rule.key, "Created policy rule via {path}");
        Ok(())
    }

    /// Add a data category target to a rule.
    ///
    /// # Errors
    ///
    /// Returns an error on a non-success status or if nothing succeeded.
    pub async fn create_rule_target(
        &self,
        policy_key: &str,
        rule_key: &str,
        data_category: &str,
    ) -> Result<()> {
        let path = format!("/api/v1/policy/{policy_key}/rule/{rule_key}/target");
        let body = [RuleTarget { data_category }];
        self.bulk("policy rule target creation", Method::PATCH, &path, &body)
            .await?;

        tracing::info!(data_category, "Created policy rule target via {path}");
        Ok(())
    }

    // =========================================================================
    // Privacy requests
    // =========================================================================

    /// Submit a privacy request for `email` under `policy_key`.
    ///
    /// Returns the id of the created request.
    ///
    /// # Errors
    ///
    /// Returns `PrivacyOpsError::UnexpectedResponse` if the response has no id.
    pub async fn create_privacy_request(&self, email: &str, policy_key: &str) -> Result<String> {
        const OPERATION: &str = "privacy request creation";

        let body = [PrivacyRequestCreate {
            requested_at: chrono::Utc::now().naive_utc().to_string(),
            policy_key,
            identity: Identity { email },
        }];
        let response = self
            .bulk(OPERATION, Method::POST, "/api/v1/privacy-request", &body)
            .await?;

        let id = response
            .succeeded
            .first()
            .and_then(|request| request.get("id"))
            .and_then(Value::as_str)
            .ok_or_else(|| PrivacyOpsError::UnexpectedResponse {
                operation: OPERATION,
                detail: "missing request id".to_string(),
            })?;

        tracing::info!(email, request_id = id, "Created privacy request via /api/v1/privacy-request");
        Ok(id.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;

    fn client(server: &MockServer) -> PrivacyOpsClient {
        PrivacyOpsClient::new(Url::parse(&server.base_url()).unwrap()).unwrap()
    }

    async fn logged_in(server: &MockServer) -> PrivacyOpsClient {
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v1/oauth/token");
                then.status(200).json_body(json!({"access_token": "t0k3n"}));
            })
            .await;

        let mut client = client(server);
        client
            .login("root", &SecretString::from("secret"))
            .await
            .unwrap();
        client
    }

    #[tokio::test]
    async fn test_login_rejects_empty_token() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v1/oauth/token");
                then.status(200).json_body(json!({"access_token": ""}));
            })
            .await;

        let err = client(&server)
            .login("root", &SecretString::from("secret"))
            .await
            .unwrap_err();
        assert!(matches!(err, PrivacyOpsError::UnexpectedResponse { .. }));
    }

    #[tokio::test]
    async fn test_login_failure_carries_status_and_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v1/oauth/token");
                then.status(401).body("bad client");
            })
            .await;

        let err = client(&server)
            .login("root", &SecretString::from("wrong"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, PrivacyOpsError::Api { status: 401, ref body, .. } if body == "bad client")
        );
    }

    #[tokio::test]
    async fn test_bearer_token_sent_after_login() {
        let server = MockServer::start_async().await;
        let client = logged_in(&server).await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PATCH)
                    .path("/api/v1/policy")
                    .header("authorization", "Bearer t0k3n")
                    .json_body(json!([{"name": "p", "key": "p"}]));
                then.status(200)
                    .json_body(json!({"succeeded": [{"key": "p"}], "failed": []}));
            })
            .await;

        client.create_policy("p").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_bulk_with_no_successes_fails() {
        let server = MockServer::start_async().await;
        let client = logged_in(&server).await;
        server
            .mock_async(|when, then| {
                when.method(PATCH).path("/api/v1/storage/config");
                then.status(200)
                    .json_body(json!({"succeeded": [], "failed": [{"message": "bad"}]}));
            })
            .await;

        let err = client.create_storage("default_storage", "json").await.unwrap_err();
        assert!(matches!(err, PrivacyOpsError::UnexpectedResponse { .. }));
    }

    #[tokio::test]
    async fn test_create_user_already_exists() {
        let server = MockServer::start_async().await;
        let client = logged_in(&server).await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v1/user");
                then.status(400)
                    .json_body(json!({"detail": "Username already exists."}));
            })
            .await;

        let outcome = client
            .create_user("operator", &SecretString::from("pw"))
            .await
            .unwrap();
        assert_eq!(outcome, StepOutcome::AlreadyExists);
    }

    #[tokio::test]
    async fn test_create_user_other_400_is_fatal() {
        let server = MockServer::start_async().await;
        let client = logged_in(&server).await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v1/user");
                then.status(400).json_body(json!({"detail": "Password too weak."}));
            })
            .await;

        let err = client
            .create_user("operator", &SecretString::from("pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, PrivacyOpsError::Api { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_configure_connection_test_failed() {
        let server = MockServer::start_async().await;
        let client = logged_in(&server).await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/api/v1/connection/shopkeep_postgres/secret");
                then.status(200)
                    .json_body(json!({"test_status": "failed", "msg": "could not connect"}));
            })
            .await;

        let database = DatabaseTarget::parse("TEST", "postgres://u:p@db:5432/shopkeep").unwrap();
        let err = client
            .configure_connection("shopkeep_postgres", &database)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("could not connect"));
    }

    #[tokio::test]
    async fn test_validate_dataset_not_traversable() {
        let server = MockServer::start_async().await;
        let client = logged_in(&server).await;
        server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/api/v1/connection/shopkeep_postgres/validate_dataset");
                then.status(200).json_body(json!({
                    "dataset": {},
                    "traversal_details": {"is_traversable": false, "msg": "unreachable: products"}
                }));
            })
            .await;

        let err = client
            .validate_dataset("shopkeep_postgres", &json!({"fides_key": "shopkeep_postgres"}))
            .await
            .unwrap_err();
        assert!(matches!(err, PrivacyOpsError::NotTraversable(ref m) if m.contains("products")));
    }

    #[tokio::test]
    async fn test_create_privacy_request_returns_id() {
        let server = MockServer::start_async().await;
        let client = logged_in(&server).await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v1/privacy-request");
                then.status(200).json_body(json!({
                    "succeeded": [{"id": "pri_123", "status": "pending"}],
                    "failed": []
                }));
            })
            .await;

        let id = client
            .create_privacy_request("user@example.com", "example_request_policy")
            .await
            .unwrap();
        assert_eq!(id, "pri_123");
    }

    #[tokio::test]
    async fn test_wait_until_healthy_times_out() {
        // Nothing listens on port 9 (discard) in the test environment.
        let client = PrivacyOpsClient::new(Url::parse("http://127.0.0.1:9").unwrap()).unwrap();
        let err = client
            .wait_until_healthy(Duration::from_millis(50), Duration::from_millis(10))
            .await
            .unwrap_err();
        assert!(matches!(err, PrivacyOpsError::Unhealthy { .. }));
    }
}
