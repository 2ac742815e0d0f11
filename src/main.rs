//! # Tax Reference Catalog Main Driver
//!
//! ## Purpose
//! Main entry point for the catalog server. Orchestrates configuration,
//! storage initialization and the web server for handling catalog requests.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration file, command line arguments, environment
//! - **Output**: Running web server with catalog API endpoints
//!
//! ## Architecture Flow
//! 1. Parse command line arguments and load configuration
//! 2. Initialize logging and tracing
//! 3. Open the storage backend and the document store
//! 4. Start web API server
//! 5. Handle shutdown signals gracefully, flushing the store

use clap::{Arg, Command};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use tax_reference::{
    api::ApiServer,
    config::Config,
    errors::{CatalogError, Result},
    store::{Confirmation, DocumentStore, SledBackend},
    AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("tax-catalog-server")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Tax Reference Team")
        .about("Reference catalog service for Egyptian tax-law documents")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Server port")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("reseed")
                .long("reseed")
                .help("Reset the collection to the seed data on startup")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("check-health")
                .long("check-health")
                .help("Run health checks and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    // Load configuration
    let config_path = matches.get_one::<String>("config").unwrap();
    let mut config = Config::from_file(config_path)?;

    // Override port if specified
    if let Some(port) = matches.get_one::<u16>("port") {
        config.server.port = *port;
    }

    let config = Arc::new(config);

    init_logging(&config)?;

    info!("Starting Tax Reference Catalog v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from: {}", config_path);

    // Initialize application components
    let app_state = initialize_components(config.clone())?;

    if matches.get_flag("check-health") {
        app_state.store.health_check()?;
        info!("All health checks passed!");
        return Ok(());
    }

    // The CLI flag is the explicit confirmation the reset gate requires.
    if matches.get_flag("reseed") {
        info!("Resetting collection to seed data...");
        app_state.store.reset(Confirmation::Confirmed)?;
    }

    // Start the API server
    let server = ApiServer::new(app_state.clone());
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.run().await {
            error!("Server error: {}", e);
        }
    });

    info!(
        "Tax Reference Catalog started on {}:{}",
        config.server.host, config.server.port
    );

    // Wait for shutdown signal
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
        _ = server_handle => {
            warn!("Server stopped unexpectedly");
        }
    }

    shutdown_components(&app_state);
    info!("Tax Reference Catalog shut down successfully");

    Ok(())
}

/// Initialize logging and tracing
fn init_logging(config: &Config) -> Result<()> {
    let log_level: tracing::Level =
        config.logging.level.parse().map_err(|_| CatalogError::Config {
            message: format!("Invalid log level: {}", config.logging.level),
        })?;
    let filter = tracing_subscriber::filter::LevelFilter::from_level(log_level);

    if config.logging.json_format {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .json()
                    .with_filter(filter),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_filter(filter),
            )
            .init();
    }

    info!("Logging initialized with level: {}", config.logging.level);
    Ok(())
}

/// Initialize all application components
fn initialize_components(config: Arc<Config>) -> Result<AppState> {
    info!("Initializing application components...");

    info!("Opening storage backend at {:?}", config.storage.db_path);
    let backend = Arc::new(SledBackend::open(&config.storage.db_path)?);

    let store = Arc::new(DocumentStore::open_with_key(
        backend,
        &config.storage.collection_key,
    ));
    info!("Document store ready with {} documents", store.len());

    store.health_check()?;
    info!("✓ Document store is healthy");

    Ok(AppState { config, store })
}

/// Gracefully shut down: flush the store so the durable copy is current.
fn shutdown_components(app_state: &AppState) {
    info!("Shutting down components...");

    if let Err(e) = app_state.store.flush() {
        error!("Final flush failed: {}", e);
    }

    info!("All components shut down successfully");
}
