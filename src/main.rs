// SPDX-License-Identifier: MIT

//! Courier-Ledger API Server
//!
//! Tracks a delivery round operator's daily activities, parcel manifests,
//! per-round pricing, and earnings reports.

use courier_ledger::{
    config::Config,
    db::FirestoreDb,
    services::{ConditionsService, DirectionsClient},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Courier-Ledger API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // External API clients
    let directions = DirectionsClient::new(config.mapbox_token.clone());
    let conditions = ConditionsService::new(
        config.openweathermap_key.clone(),
        config.tomtom_key.clone(),
    );
    tracing::info!("External API clients initialized");

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        directions,
        conditions,
    });

    // Build router
    let app = courier_ledger::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("courier_ledger=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
