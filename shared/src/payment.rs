//! Payment-processor reference types
//!
//! These mirror objects owned by the processor. The orchestrator never
//! caches their status beyond the current render; it re-fetches instead.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a payment intent, as reported by the processor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresCapture,
    Processing,
    Succeeded,
    Canceled,
    RequiresAction,
    /// Forward compatibility with statuses this console does not know
    #[serde(other)]
    Unknown,
}

impl PaymentIntentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequiresPaymentMethod => "requires_payment_method",
            Self::RequiresConfirmation => "requires_confirmation",
            Self::RequiresCapture => "requires_capture",
            Self::Processing => "processing",
            Self::Succeeded => "succeeded",
            Self::Canceled => "canceled",
            Self::RequiresAction => "requires_action",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for PaymentIntentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reference to a payment intent at the processor.
///
/// The id is the join key stored back onto an Order record; the intent
/// itself stays the processor's system of record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntentRef {
    pub id: String,
    pub status: PaymentIntentStatus,
    /// Amount in integer minor units
    pub amount: i64,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
}

/// Connection status of a terminal reader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReaderStatus {
    Online,
    Offline,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for ReaderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Offline => write!(f, "offline"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// A card-present terminal reader registered with the processor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalReader {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub status: ReaderStatus,
}
