//! Payment gateway adapter
//!
//! [`PaymentGateway`] is the seam between the checkout orchestrator and
//! the payment processor; [`StripeGateway`] drives Stripe's REST API
//! directly. Tests exercise the orchestrator against fakes of this trait.

mod stripe;

pub use stripe::StripeGateway;

use async_trait::async_trait;
use shared::error::PosError;
use shared::payment::{PaymentIntentRef, TerminalReader};
use thiserror::Error;

/// Processor error code signalling that the saved payment method needs
/// fresh authentication from the customer
const AUTHENTICATION_REQUIRED: &str = "payment_intent_authentication_required";

/// Gateway-layer error
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The processor rejected the call; code and message pass through
    /// unmodified for operator display
    #[error("{message}")]
    Api {
        code: Option<String>,
        message: String,
    },

    /// The processor was unreachable
    #[error("payment processor unreachable: {0}")]
    Network(String),

    /// The processor does not know the referenced intent
    #[error("payment intent {0} not found")]
    NotFound(String),

    /// The intent was created but the reader dispatch failed. The created
    /// intent still exists at the processor; its id is surfaced here so
    /// the caller can retry the dispatch or cancel it.
    #[error("intent {intent_id} created but reader dispatch failed: {message}")]
    Dispatch {
        intent_id: String,
        code: Option<String>,
        message: String,
    },
}

impl GatewayError {
    /// True when the processor asks for customer authentication; the
    /// caller should prompt for a new payment method instead of retrying
    pub fn requires_authentication(&self) -> bool {
        match self {
            Self::Api { code, .. } | Self::Dispatch { code, .. } => {
                code.as_deref() == Some(AUTHENTICATION_REQUIRED)
            }
            _ => false,
        }
    }

    /// The id of an intent that exists at the processor despite the
    /// failure, if any
    pub fn created_intent_id(&self) -> Option<&str> {
        match self {
            Self::Dispatch { intent_id, .. } => Some(intent_id),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}

impl From<GatewayError> for PosError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::NotFound(id) => PosError::not_found(format!("payment intent {id}")),
            GatewayError::Network(msg) => PosError::gateway(None, msg),
            GatewayError::Api { code, message } => PosError::gateway(code, message),
            GatewayError::Dispatch {
                intent_id,
                code,
                message,
            } => PosError::gateway(
                code,
                format!("intent {intent_id} created but reader dispatch failed: {message}"),
            ),
        }
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Operations the checkout orchestrator needs from the payment processor
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// List registered terminal readers. An empty list is not an error.
    async fn list_readers(&self) -> GatewayResult<Vec<TerminalReader>>;

    /// Create a processor customer for a receipt email
    async fn create_customer(&self, email: &str) -> GatewayResult<String>;

    /// Create a card-present intent with automatic capture and instruct
    /// the named reader to collect it. Both steps must succeed; a dispatch
    /// failure after creation surfaces the created intent id.
    async fn create_and_dispatch_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        reader_id: &str,
        customer_id: Option<&str>,
    ) -> GatewayResult<PaymentIntentRef>;

    /// Re-fetch an intent's current status. Read-only, safe to poll.
    async fn retrieve_status(&self, intent_id: &str) -> GatewayResult<PaymentIntentRef>;

    /// Charge a saved payment method without the customer present,
    /// confirmed and captured in one call
    async fn capture_off_session(
        &self,
        customer_id: &str,
        payment_method_id: &str,
        amount_minor: i64,
        currency: &str,
        order_id: &str,
    ) -> GatewayResult<PaymentIntentRef>;

    /// Capture an intent that was authorized earlier but not captured
    async fn capture_existing_intent(&self, intent_id: &str) -> GatewayResult<PaymentIntentRef>;
}
