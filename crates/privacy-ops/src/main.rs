//! privacy-ops - Provision the privacy-request service for Shopkeep.
//!
//! # Usage
//!
//! ```bash
//! # Provision defaults, then run example requests interactively
//! privacy-ops
//!
//! # Provision only (e.g. from docker-compose)
//! privacy-ops --setup-only
//!
//! # One access request for user@example.com with step logging
//! privacy-ops --non-interactive --verbose
//! ```
//!
//! See [`shopkeep_privacy_ops::config`] for environment variables.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::Parser;

use shopkeep_privacy_ops::config::PrivacyOpsConfig;
use shopkeep_privacy_ops::{RunOptions, run};

#[derive(Parser)]
#[command(name = "privacy-ops")]
#[command(author, version, about = "Provision the privacy-request service for Shopkeep")]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Log every step at info level
    #[arg(long)]
    verbose: bool,
    /// Wait for Enter between phases
    #[arg(long)]
    pause: bool,
    /// Exit after the default user, connection, storage, and policies exist
    #[arg(long)]
    setup_only: bool,
    /// Use the default answer for every prompt and run a single request
    #[arg(long)]
    non_interactive: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("shopkeep_privacy_ops={default_level}").into()),
        )
        .init();

    let config = match PrivacyOpsConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    #[allow(clippy::print_stdout)]
    {
        println!("Setting up the privacy-request service with the following configuration:");
        println!("{}", config.summary());
    }

    let options = RunOptions {
        pause: cli.pause,
        setup_only: cli.setup_only,
        non_interactive: cli.non_interactive,
    };

    if let Err(e) = run(&config, options).await {
        tracing::error!("privacy-ops failed: {e}");
        std::process::exit(1);
    }
}
