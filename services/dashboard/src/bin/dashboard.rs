//! services/dashboard/src/bin/dashboard.rs

use clap::Parser;
use dashboard_lib::{
    adapters::DocRouterClient,
    cli::Cli,
    commands::{self, App},
    config::{Config, SettingsStore},
    error::DashboardError,
    stores::{DocumentStore, GradingStore, RubricStore},
};
use grading_assistant_core::ports::DocRouterService;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), DashboardError> {
    // --- 1. Parse the Command Line & Load Configuration ---
    let cli = Cli::parse();
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    debug!("Configuration loaded");

    // --- 2. Open the Credential Store ---
    let settings = Arc::new(SettingsStore::open(
        config.credentials_path.clone(),
        config.credential_defaults.clone(),
    )?);

    // --- 3. Wire the API Client and the Domain Stores ---
    let api: Arc<dyn DocRouterService> = Arc::new(DocRouterClient::new(settings.clone()));
    let app = App {
        settings: settings.clone(),
        api: api.clone(),
        documents: DocumentStore::new(api.clone(), settings.clone()),
        rubrics: RubricStore::new(api.clone()),
        grading: GradingStore::new(api.clone()),
    };

    // --- 4. Dispatch the Command ---
    if let Err(e) = commands::run(&app, cli.command).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
