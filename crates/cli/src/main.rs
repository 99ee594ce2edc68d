//! Shopkeep CLI - Database migrations and demo data.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront migrations (schema and session store)
//! shopkeep migrate
//!
//! # Recreate the demo database: migrate, clear all rows, load demo data
//! shopkeep init-db
//!
//! # Load demo data into empty tables
//! shopkeep seed
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shopkeep")]
#[command(author, version, about = "Shopkeep CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Migrate, clear all storefront rows, and load the demo data
    InitDb,
    /// Load the demo users, products, and purchase
    Seed,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shopkeep_storefront=info,shopkeep_cli=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let pool = commands::connect().await?;

    match cli.command {
        Commands::Migrate => commands::migrate::run(&pool).await?,
        Commands::InitDb => {
            commands::migrate::run(&pool).await?;
            commands::seed::reset(&pool).await?;
            commands::seed::demo(&pool).await?;
        }
        Commands::Seed => commands::seed::demo(&pool).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_init_db() {
        let cli = Cli::try_parse_from(["shopkeep", "init-db"]);
        assert!(matches!(cli.map(|c| c.command), Ok(Commands::InitDb)));
    }
}
