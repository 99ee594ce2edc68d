//! Provisioning steps that bring a fresh service to a usable state.
//!
//! Steps run in a fixed order. Each returns a [`StepOutcome`] or aborts the
//! whole run with an error.

use std::fmt;
use std::time::Duration;

use crate::client::PrivacyOpsClient;
use crate::config::PrivacyOpsConfig;
use crate::error::Result;
use crate::types::{ActionType, MaskingStrategy, RuleCreate};

/// Connection key the storefront database is registered under.
pub const CONNECTION_KEY: &str = "shopkeep_postgres";

/// Storage destination for access request results.
pub const STORAGE_KEY: &str = "default_storage";

/// Data category targeted by the default policies.
pub const DEFAULT_DATA_CATEGORY: &str = "user.provided.identifiable.contact";

/// Scopes granted to the application OAuth client.
pub const CLIENT_SCOPES: [&str; 34] = [
    "client:create",
    "client:delete",
    "client:read",
    "client:update",
    "config:read",
    "connection:create_or_update",
    "connection:delete",
    "connection:read",
    "dataset:create_or_update",
    "dataset:delete",
    "dataset:read",
    "encryption:exec",
    "policy:create_or_update",
    "policy:delete",
    "policy:read",
    "privacy-request:delete",
    "privacy-request:read",
    "privacy-request:resume",
    "privacy-request:review",
    "rule:create_or_update",
    "rule:delete",
    "rule:read",
    "saas_config:create_or_update",
    "saas_config:delete",
    "saas_config:read",
    "scope:read",
    "storage:create_or_update",
    "storage:delete",
    "storage:read",
    "user:create",
    "user:delete",
    "webhook:create_or_update",
    "webhook:delete",
    "webhook:read",
];

const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Result of a step that completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Created,
    AlreadyExists,
}

/// A named provisioning step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    WaitForHealth,
    RootLogin,
    CreateClient,
    ClientLogin,
    CreateUser,
    CreateConnection,
    ConfigureConnection,
    CreateStorage,
    AccessPolicy,
    ErasurePolicy,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::WaitForHealth => "wait for health",
            Self::RootLogin => "root login",
            Self::CreateClient => "create oauth client",
            Self::ClientLogin => "client login",
            Self::CreateUser => "create user",
            Self::CreateConnection => "create connection",
            Self::ConfigureConnection => "configure connection",
            Self::CreateStorage => "create storage",
            Self::AccessPolicy => "default access policy",
            Self::ErasurePolicy => "default erasure policy",
        };
        f.write_str(name)
    }
}

/// Steps completed during a run, in order.
#[derive(Debug, Default)]
pub struct ProvisionReport {
    pub steps: Vec<(Step, StepOutcome)>,
}

impl ProvisionReport {
    fn record(&mut self, step: Step, outcome: StepOutcome) {
        tracing::info!(%step, ?outcome, "Step complete");
        self.steps.push((step, outcome));
    }
}

/// A policy with a single rule and its data category targets.
#[derive(Debug, Clone)]
pub struct PolicyPlan<'a> {
    pub policy_key: &'a str,
    pub rule_key: &'a str,
    pub action_type: ActionType,
    pub storage_destination_key: Option<&'a str>,
    pub masking_strategy: Option<MaskingStrategy>,
    pub data_categories: Vec<String>,
}

impl PolicyPlan<'_> {
    /// Access policy that uploads contact data to local storage.
    #[must_use]
    pub fn default_access() -> PolicyPlan<'static> {
        PolicyPlan {
            policy_key: "default_access_policy",
            rule_key: "default_access_rule",
            action_type: ActionType::Access,
            storage_destination_key: Some(STORAGE_KEY),
            masking_strategy: None,
            data_categories: vec![DEFAULT_DATA_CATEGORY.to_string()],
        }
    }

    /// Erasure policy that masks contact data with HMAC.
    #[must_use]
    pub fn default_erasure() -> PolicyPlan<'static> {
        PolicyPlan {
            policy_key: "default_erasure_policy",
            rule_key: "default_erasure_rule",
            action_type: ActionType::Erasure,
            storage_destination_key: None,
            masking_strategy: Some(MaskingStrategy::hmac()),
            data_categories: vec![DEFAULT_DATA_CATEGORY.to_string()],
        }
    }
}

/// Create the policy, replace its rule, and add one target per category.
///
/// The old rule is deleted first so stale targets do not survive. A failed
/// delete (usually "not found") is only logged.
///
/// # Errors
///
/// Returns an error if creating the policy, rule, or any target fails.
pub async fn apply_policy(client: &PrivacyOpsClient, plan: &PolicyPlan<'_>) -> Result<()> {
    client.create_policy(plan.policy_key).await?;

    if let Err(e) = client
        .delete_policy_rule(plan.policy_key, plan.rule_key)
        .await
    {
        tracing::debug!(
            policy_key = plan.policy_key,
            rule_key = plan.rule_key,
            error = %e,
            "Ignoring failed rule delete"
        );
    }

    let rule = RuleCreate {
        name: plan.rule_key,
        key: plan.rule_key,
        action_type: plan.action_type,
        storage_destination_key: plan.storage_destination_key,
        masking_strategy: plan.masking_strategy.clone(),
    };
    client.create_policy_rule(plan.policy_key, &rule).await?;

    for category in &plan.data_categories {
        client
            .create_rule_target(plan.policy_key, plan.rule_key, category)
            .await?;
    }
    Ok(())
}

/// Wait for the service, then swap the root credentials for a freshly minted
/// application client.
///
/// # Errors
///
/// Returns an error if the service stays unhealthy or any OAuth call fails.
pub async fn authenticate(
    client: &mut PrivacyOpsClient,
    config: &PrivacyOpsConfig,
    report: &mut ProvisionReport,
) -> Result<()> {
    client
        .wait_until_healthy(config.health_timeout, HEALTH_POLL_INTERVAL)
        .await?;
    report.record(Step::WaitForHealth, StepOutcome::Created);

    client
        .login(&config.root_client_id, &config.root_client_secret)
        .await?;
    report.record(Step::RootLogin, StepOutcome::Created);

    let credentials = client.create_oauth_client(&CLIENT_SCOPES).await?;
    report.record(Step::CreateClient, StepOutcome::Created);

    client
        .login(
            &credentials.client_id,
            &secrecy::SecretString::from(credentials.client_secret),
        )
        .await?;
    report.record(Step::ClientLogin, StepOutcome::Created);
    Ok(())
}

/// Create the operator account, database connection, storage, and the
/// default access and erasure policies.
///
/// # Errors
///
/// Returns the first failing step's error.
pub async fn setup_defaults(
    client: &PrivacyOpsClient,
    config: &PrivacyOpsConfig,
    report: &mut ProvisionReport,
) -> Result<()> {
    let outcome = client.create_user(&config.username, &config.password).await?;
    report.record(Step::CreateUser, outcome);

    client.create_connection(CONNECTION_KEY).await?;
    report.record(Step::CreateConnection, StepOutcome::Created);

    client
        .configure_connection(CONNECTION_KEY, &config.database)
        .await?;
    report.record(Step::ConfigureConnection, StepOutcome::Created);

    client.create_storage(STORAGE_KEY, "json").await?;
    report.record(Step::CreateStorage, StepOutcome::Created);

    apply_policy(client, &PolicyPlan::default_access()).await?;
    report.record(Step::AccessPolicy, StepOutcome::Created);

    apply_policy(client, &PolicyPlan::default_erasure()).await?;
    report.record(Step::ErasurePolicy, StepOutcome::Created);

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use httpmock::prelude::*;
    use secrecy::SecretString;
    use serde_json::json;
    use url::Url;

    use super::*;
    use crate::config::DatabaseTarget;

    fn config(server: &MockServer) -> PrivacyOpsConfig {
        PrivacyOpsConfig {
            base_url: Url::parse(&server.base_url()).unwrap(),
            root_client_id: "root".to_string(),
            root_client_secret: SecretString::from("rootsecret"),
            username: "operator".to_string(),
            password: SecretString::from("pw"),
            database: DatabaseTarget::parse("TEST", "postgres://postgres:postgres@db:5432/shopkeep")
                .unwrap(),
            dataset_path: "unused.yml".into(),
            results_dir: "unused".into(),
            health_timeout: Duration::from_secs(1),
        }
    }

    fn succeeded() -> serde_json::Value {
        json!({"succeeded": [{}], "failed": []})
    }

    #[test]
    fn test_scopes_are_unique() {
        let mut scopes = CLIENT_SCOPES.to_vec();
        scopes.sort_unstable();
        scopes.dedup();
        assert_eq!(scopes.len(), CLIENT_SCOPES.len());
    }

    #[tokio::test]
    async fn test_authenticate_swaps_to_application_client() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/health");
                then.status(200).json_body(json!({"webserver": "healthy"}));
            })
            .await;
        let root_login = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/v1/oauth/token")
                    .body_includes("client_id=root");
                then.status(200).json_body(json!({"access_token": "root-token"}));
            })
            .await;
        let create_client = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/v1/oauth/client")
                    .header("authorization", "Bearer root-token");
                then.status(200)
                    .json_body(json!({"client_id": "app", "client_secret": "appsecret"}));
            })
            .await;
        let app_login = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/v1/oauth/token")
                    .body_includes("client_id=app");
                then.status(200).json_body(json!({"access_token": "app-token"}));
            })
            .await;

        let config = config(&server);
        let mut client = PrivacyOpsClient::new(config.base_url.clone()).unwrap();
        let mut report = ProvisionReport::default();
        authenticate(&mut client, &config, &mut report).await.unwrap();

        root_login.assert_async().await;
        create_client.assert_async().await;
        app_login.assert_async().await;
        assert_eq!(report.steps.len(), 4);
    }

    #[tokio::test]
    async fn test_setup_defaults_tolerates_existing_user_and_missing_rules() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v1/user");
                then.status(400)
                    .json_body(json!({"detail": "Username already exists."}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(PATCH).path("/api/v1/connection");
                then.status(200).json_body(succeeded());
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/api/v1/connection/shopkeep_postgres/secret");
                then.status(200).json_body(json!({"test_status": "succeeded"}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(PATCH).path("/api/v1/storage/config");
                then.status(200).json_body(succeeded());
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(PATCH).path("/api/v1/policy");
                then.status(200).json_body(succeeded());
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path_includes("/rule/");
                then.status(404).json_body(json!({"detail": "No Rule found"}));
            })
            .await;
        let erasure_rule = server
            .mock_async(|when, then| {
                when.method(PATCH)
                    .path("/api/v1/policy/default_erasure_policy/rule")
                    .json_body(json!([{
                        "name": "default_erasure_rule",
                        "key": "default_erasure_rule",
                        "action_type": "erasure",
                        "storage_destination_key": null,
                        "masking_strategy": {"strategy": "hmac", "configuration": {}}
                    }]));
                then.status(200).json_body(succeeded());
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(PATCH).path("/api/v1/policy/default_access_policy/rule");
                then.status(200).json_body(succeeded());
            })
            .await;
        let targets = server
            .mock_async(|when, then| {
                when.method(PATCH)
                    .path_includes("/target")
                    .json_body(json!([{"data_category": DEFAULT_DATA_CATEGORY}]));
                then.status(200).json_body(succeeded());
            })
            .await;

        let config = config(&server);
        let client = PrivacyOpsClient::new(config.base_url.clone()).unwrap();
        let mut report = ProvisionReport::default();
        setup_defaults(&client, &config, &mut report).await.unwrap();

        erasure_rule.assert_async().await;
        targets.assert_calls_async(2).await;
        assert_eq!(
            report.steps.first(),
            Some(&(Step::CreateUser, StepOutcome::AlreadyExists))
        );
        assert_eq!(report.steps.len(), 6);
    }

    #[tokio::test]
    async fn test_setup_defaults_stops_at_first_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v1/user");
                then.status(200).json_body(json!({"id": "usr_1"}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(PATCH).path("/api/v1/connection");
                then.status(422).body("invalid connection");
            })
            .await;
        let storage = server
            .mock_async(|when, then| {
                when.method(PATCH).path("/api/v1/storage/config");
                then.status(200).json_body(succeeded());
            })
            .await;

        let config = config(&server);
        let client = PrivacyOpsClient::new(config.base_url.clone()).unwrap();
        let mut report = ProvisionReport::default();
        let err = setup_defaults(&client, &config, &mut report).await.unwrap_err();

        assert!(err.to_string().contains("invalid connection"));
        storage.assert_calls_async(0).await;
        assert_eq!(report.steps, vec![(Step::CreateUser, StepOutcome::Created)]);
    }
}
