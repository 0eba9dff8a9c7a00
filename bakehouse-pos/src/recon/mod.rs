//! Order reconciliation client
//!
//! Talks to the external order-management API: listing orders,
//! subscriptions and customers, and pushing delivery/payment updates
//! back. [`OrdersApi`] is the seam the sagas depend on; [`OrdersClient`]
//! is the HTTP implementation.

mod client;

pub use client::OrdersClient;

use async_trait::async_trait;
use shared::error::PosError;
use shared::order::{Customer, Order, Subscription};
use thiserror::Error;

/// Upstream-layer error
#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    /// The order-management API was unreachable
    #[error("order service unreachable: {0}")]
    Network(String),

    /// Non-2xx answer; status and body are kept for diagnostics
    #[error("order service answered {status}: {body}")]
    Status { status: u16, body: String },
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}

impl From<UpstreamError> for PosError {
    fn from(e: UpstreamError) -> Self {
        match e {
            UpstreamError::Network(msg) => PosError::upstream(None, msg),
            UpstreamError::Status { status, body } => PosError::upstream(Some(status), body),
        }
    }
}

/// Result type for upstream operations
pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// Operations the console needs from the order-management API
#[async_trait]
pub trait OrdersApi: Send + Sync {
    async fn list_orders(&self) -> UpstreamResult<Vec<Order>>;

    async fn list_subscriptions(&self) -> UpstreamResult<Vec<Subscription>>;

    async fn list_customers(&self) -> UpstreamResult<Vec<Customer>>;

    /// Patch only the order's delivery status to `delivered`. Safe to
    /// repeat from the caller's perspective; an upstream rejection of a
    /// second call surfaces as a normal error.
    async fn mark_delivered(&self, order_id: &str) -> UpstreamResult<()>;

    /// Record the payment-intent id and status on the order after a
    /// capture. Best-effort: the capture at the processor stays
    /// authoritative whatever happens here.
    async fn record_payment_outcome(
        &self,
        order_id: &str,
        payment_intent_id: &str,
        payment_status: &str,
    ) -> UpstreamResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_carries_upstream_detail() {
        let err = UpstreamError::Status {
            status: 422,
            body: "{\"error\":\"already delivered\"}".to_string(),
        };
        assert!(err.to_string().contains("422"));
        assert!(err.to_string().contains("already delivered"));

        let pos: PosError = err.into();
        match pos {
            PosError::Upstream { status, message } => {
                assert_eq!(status, Some(422));
                assert!(message.contains("already delivered"));
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }
}
