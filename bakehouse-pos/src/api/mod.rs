//! API routes for the operator console

pub mod checkout;
pub mod health;
pub mod orders;
pub mod readers;

use crate::state::AppState;
use axum::routing::{get, post, put};
use axum::Router;

/// Create the console router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/readers", get(readers::list_readers))
        .route(
            "/api/checkout",
            get(checkout::view).post(checkout::begin),
        )
        .route("/api/checkout/cart", post(checkout::update_cart))
        .route("/api/checkout/surcharge", put(checkout::set_surcharge))
        .route("/api/checkout/payment", post(checkout::submit_payment))
        .route("/api/checkout/status", post(checkout::check_status))
        .route("/api/checkout/reset", post(checkout::reset))
        .route("/api/orders", get(orders::list_orders))
        .route("/api/orders/update-status", post(orders::update_status))
        .route("/api/orders/capture-payment", post(orders::capture_payment))
        .route("/api/subscriptions", get(orders::list_subscriptions))
        .route("/api/users", get(orders::list_customers))
        .with_state(state)
}
