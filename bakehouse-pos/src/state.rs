//! Application state

use crate::checkout::{CheckoutSession, InFlight};
use crate::config::Config;
use crate::gateway::StripeGateway;
use crate::recon::OrdersClient;
use shared::catalog::Product;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared application state, built once at startup. Clients are
/// constructed here and injected; nothing is lazily initialized.
#[derive(Clone)]
pub struct AppState {
    /// Static product catalog
    pub catalog: Arc<Vec<Product>>,
    /// Currency for in-person charges
    pub currency: String,
    /// Payment processor client
    pub gateway: Arc<StripeGateway>,
    /// Order-management API client
    pub orders: Arc<OrdersClient>,
    /// The single operator checkout session
    pub checkout: Arc<Mutex<CheckoutSession>>,
    /// Per-order in-flight markers for capture/delivery actions
    pub in_flight: InFlight,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            checkout: Arc::new(Mutex::new(CheckoutSession::new(&config.catalog))),
            catalog: Arc::new(config.catalog.clone()),
            currency: config.currency.clone(),
            gateway: Arc::new(StripeGateway::new(config.stripe_api_key.clone())),
            orders: Arc::new(OrdersClient::new(config.orders_api_url.clone())),
            in_flight: InFlight::new(),
        }
    }
}
