//! Provisioning client for the privacy-request service paired with Shopkeep.
//!
//! Bootstraps OAuth credentials, registers the storefront database and the
//! default access and erasure policies, then optionally walks an operator
//! through example privacy requests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod config;
pub mod dataset;
pub mod error;
pub mod provision;
pub mod request;
pub mod results;
pub mod types;

use crate::client::PrivacyOpsClient;
use crate::config::PrivacyOpsConfig;
use crate::error::Result;
use crate::provision::ProvisionReport;
use crate::request::{DefaultsPrompter, Prompter, StdinPrompter};

/// How a run interacts with the operator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Wait for Enter between phases
    pub pause: bool,
    /// Stop once the defaults are in place
    pub setup_only: bool,
    /// Accept every default and run a single request
    pub non_interactive: bool,
}

/// Provision the service and, unless `setup_only`, run the request loop.
///
/// # Errors
///
/// Returns the first failing step's error.
pub async fn run(config: &PrivacyOpsConfig, options: RunOptions) -> Result<ProvisionReport> {
    let mut prompter: Box<dyn Prompter> = if options.non_interactive {
        Box::new(DefaultsPrompter)
    } else {
        Box::new(StdinPrompter::new(options.pause))
    };

    let mut client = PrivacyOpsClient::new(config.base_url.clone())?;
    let mut report = ProvisionReport::default();

    prompter.pause()?;
    #[allow(clippy::print_stdout)]
    {
        println!("Waiting for the privacy-request service to be healthy...");
    }
    provision::authenticate(&mut client, config, &mut report).await?;

    tracing::info!("Setting up default user and policies...");
    provision::setup_defaults(&client, config, &mut report).await?;

    if options.setup_only {
        return Ok(report);
    }

    request::request_loop(&client, config, prompter.as_mut()).await?;
    Ok(report)
}
