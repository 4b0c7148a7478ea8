use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{DEFAULT_REST_ADDR, ENV_REST_ADDR};
use dash_core::DashConfig;

/// Main entry point for the EHR dashboard service
///
/// Resolves configuration once, then serves the record source endpoint together with its
/// OpenAPI document and Swagger UI.
///
/// # Environment Variables
/// - `EHR_DASH_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `EHR_API_BASE_URL`, `EHR_DASH_DEFAULT_COUNT`, `EHR_DASH_PAGE_SIZE`, `EHR_DASH_OVERSCAN`:
///   validated at startup so a bad `.env` fails fast
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, binding or serving fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ehr_dash_run=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = DashConfig::from_env()?;
    let rest_addr = std::env::var(ENV_REST_ADDR).unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    tracing::info!("++ Starting EHR dashboard REST on {}", rest_addr);
    tracing::info!(
        "++ Dashboard defaults: {} records, page size {}, upstream {}",
        cfg.default_count(),
        cfg.page_size(),
        cfg.api_base_url()
    );

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, api_rest::router()).await?;

    Ok(())
}
