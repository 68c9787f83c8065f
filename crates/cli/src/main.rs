//! Product analytics dashboard - terminal front end.
//!
//! # Usage
//!
//! ```bash
//! # Live dashboard with auto-refresh and interactive commands
//! wb-dash watch
//!
//! # Refresh every 10 seconds against a specific backend
//! wb-dash --api-url http://analytics.local:8000 watch --interval 10
//!
//! # Print one page of products, highest rated first
//! wb-dash products --sort rating --desc --min-reviews 20
//!
//! # Print the catalogue's maximum price
//! wb-dash max-price
//! ```
//!
//! # Commands
//!
//! - `watch` - Live dashboard driven by stdin commands
//! - `products` - Fetch and print a single page
//! - `max-price` - Print the highest price in the catalogue

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use wb_dashboard::DashboardConfig;
use wb_dashboard::telemetry;

mod commands;

#[derive(Parser)]
#[command(name = "wb-dash")]
#[command(author, version, about = "Product analytics dashboard")]
struct Cli {
    /// Backend base URL (overrides `DASHBOARD_API_URL`)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Live dashboard with auto-refresh
    Watch {
        /// Auto-refresh period in seconds (overrides `DASHBOARD_REFRESH_SECS`)
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
    },
    /// Fetch and print one page of products
    Products(commands::products::ProductsArgs),
    /// Print the highest price in the catalogue
    MaxPrice,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match DashboardConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt().with_writer(std::io::stderr).init();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = telemetry::init_sentry(&config);
    telemetry::init_tracing(&config);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: DashboardConfig) -> Result<(), Box<dyn std::error::Error>> {
    let config = match cli.api_url.as_deref() {
        Some(url) => config.with_api_url(url)?,
        None => config,
    };

    match cli.command {
        Commands::Watch { interval } => {
            let mut config = config;
            if let Some(secs) = interval {
                config.refresh_interval = std::time::Duration::from_secs(secs);
            }
            commands::watch::run(&config).await?;
        }
        Commands::Products(args) => commands::products::run(&config, &args).await?,
        Commands::MaxPrice => commands::max_price::run(&config).await?,
    }
    Ok(())
}
