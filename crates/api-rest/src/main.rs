//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the record source endpoint (with OpenAPI/Swagger UI) on its own.
//!
//! ## Intended use
//! Useful during development when the dashboard's `remote` source should talk to a local
//! server. The workspace's `ehr-dash-run` binary serves the same router.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the EHR dashboard REST API server
///
/// # Environment Variables
/// - `EHR_DASH_REST_ADDR`: Server address (default: "0.0.0.0:3000")
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var(api_rest::ENV_REST_ADDR)
        .unwrap_or_else(|_| api_rest::DEFAULT_REST_ADDR.into());

    tracing::info!("-- Starting EHR dashboard REST API on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, api_rest::router()).await?;

    Ok(())
}
