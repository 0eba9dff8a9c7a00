//! bakehouse-pos — point-of-sale and order-management console service
//!
//! Long-running service that:
//! - Drives in-person card payments through a Stripe Terminal reader
//! - Mirrors online orders/subscriptions/customers from the
//!   order-management API
//! - Captures previously-authorized payments and marks deliveries

mod api;
mod checkout;
mod config;
mod gateway;
mod recon;
mod state;

use config::Config;
use shared::error::PosError;
use state::AppState;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<(), PosError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bakehouse_pos=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!(
        catalog_products = config.catalog.len(),
        currency = %config.currency,
        "starting bakehouse-pos"
    );

    let state = AppState::new(&config);

    let app = api::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| PosError::config(format!("cannot bind {addr}: {e}")))?;
    tracing::info!("bakehouse-pos listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| PosError::config(format!("server error: {e}")))?;

    Ok(())
}
