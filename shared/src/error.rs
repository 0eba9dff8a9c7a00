//! Unified error system for the Bakehouse POS
//!
//! Every external-call wrapper returns a typed result; callers pattern-match
//! on [`PosError`] instead of string-sniffing. The fixed set of variants:
//!
//! - `Validation`: a precondition was not met (reader offline, total too low)
//! - `Config`: a required configuration value is absent
//! - `Gateway`: the payment processor rejected or was unreachable; carries
//!   the processor's error code verbatim for display
//! - `NotFound`: the processor does not know the referenced resource
//! - `Upstream`: the order-management API was unreachable or non-2xx;
//!   carries the upstream status and body when available
//! - `Reconciliation`: a post-capture side update failed; never blocks or
//!   reverses the payment action it followed

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Severity of an operator-facing status message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Leveled message shown inline in the operator console
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub level: LogLevel,
    pub message: String,
}

impl StatusMessage {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message)
    }
}

/// Application error for the POS service
#[derive(Debug, Clone, Error)]
pub enum PosError {
    /// A checkout/action precondition was not met
    #[error("{0}")]
    Validation(String),

    /// Required configuration is missing or malformed
    #[error("configuration error: {0}")]
    Config(String),

    /// The payment processor rejected the call or was unreachable.
    /// `code` is the processor's error code, passed through unmodified.
    #[error("{message}")]
    Gateway {
        code: Option<String>,
        message: String,
    },

    /// The processor does not know the referenced resource
    #[error("{0} not found")]
    NotFound(String),

    /// The order-management API was unreachable or answered non-2xx
    #[error("order service error: {message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    /// Post-capture side update failed; the capture itself already
    /// succeeded at the processor and stays authoritative
    #[error("payment recorded at processor, but order update failed: {0}")]
    Reconciliation(String),
}

impl PosError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn gateway(code: Option<String>, message: impl Into<String>) -> Self {
        Self::Gateway {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    /// Severity shown to the operator for this error
    pub fn level(&self) -> LogLevel {
        match self {
            Self::Reconciliation(_) => LogLevel::Warning,
            _ => LogLevel::Error,
        }
    }

    /// Operator-facing status message for this error
    pub fn status_message(&self) -> StatusMessage {
        StatusMessage::new(self.level(), self.to_string())
    }

    /// HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Gateway { .. } => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
            Self::Reconciliation(_) => StatusCode::OK,
        }
    }
}

/// Unified API response structure
///
/// All endpoints answer in this format:
/// - `level` + `message`: the operator-facing status line
/// - `data`: payload (present on success)
/// - `code`: processor/upstream error code when one exists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub level: LogLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Success response with data
    pub fn success(data: T) -> Self {
        Self {
            level: LogLevel::Success,
            message: "OK".to_string(),
            data: Some(data),
            code: None,
        }
    }

    /// Success response with a custom message
    pub fn success_with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            level: LogLevel::Success,
            message: message.into(),
            data: Some(data),
            code: None,
        }
    }

    /// Informational response with data (operation neither failed nor
    /// reached a terminal success, e.g. a payment still processing)
    pub fn info(message: impl Into<String>, data: T) -> Self {
        Self {
            level: LogLevel::Info,
            message: message.into(),
            data: Some(data),
            code: None,
        }
    }
}

impl ApiResponse<()> {
    /// Success response without data
    pub fn ok() -> Self {
        Self {
            level: LogLevel::Success,
            message: "OK".to_string(),
            data: None,
            code: None,
        }
    }

    /// Error response from a [`PosError`]
    pub fn error(err: &PosError) -> Self {
        let code = match err {
            PosError::Gateway { code, .. } => code.clone(),
            _ => None,
        };
        Self {
            level: err.level(),
            message: err.to_string(),
            data: None,
            code,
        }
    }
}

/// Type alias for Result with PosError
pub type PosResult<T> = Result<T, PosError>;

// ===== Axum Integration =====

impl axum::response::IntoResponse for PosError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        if matches!(self, PosError::Config(_)) {
            tracing::error!(error = %self, "configuration error surfaced to operator");
        }

        let status = self.http_status();
        let body = ApiResponse::<()>::error(&self);
        (status, Json(body)).into_response()
    }
}

impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_level_and_status() {
        let err = PosError::validation("reader must be online");
        assert_eq!(err.level(), LogLevel::Error);
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "reader must be online");
    }

    #[test]
    fn test_gateway_error_keeps_processor_code() {
        let err = PosError::gateway(
            Some("card_declined".to_string()),
            "Your card was declined.",
        );
        let response = ApiResponse::<()>::error(&err);
        assert_eq!(response.code.as_deref(), Some("card_declined"));
        assert_eq!(response.message, "Your card was declined.");
        assert_eq!(response.level, LogLevel::Error);
    }

    #[test]
    fn test_reconciliation_is_warning_not_error() {
        let err = PosError::Reconciliation("order service timed out".to_string());
        assert_eq!(err.level(), LogLevel::Warning);
        // A failed side update never turns the already-captured payment
        // into an HTTP error.
        assert_eq!(err.http_status(), StatusCode::OK);
    }

    #[test]
    fn test_upstream_error_carries_status() {
        let err = PosError::upstream(Some(503), "Service Unavailable");
        match err {
            PosError::Upstream { status, .. } => assert_eq!(status, Some(503)),
            _ => panic!("expected upstream error"),
        }
    }

    #[test]
    fn test_api_response_serialize() {
        let response = ApiResponse::success(42);
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"level\":\"success\""));
        assert!(json.contains("\"data\":42"));
        assert!(!json.contains("\"code\""));
    }

    #[test]
    fn test_status_message_constructors() {
        assert_eq!(StatusMessage::info("x").level, LogLevel::Info);
        assert_eq!(StatusMessage::warning("x").level, LogLevel::Warning);
        assert_eq!(StatusMessage::error("x").level, LogLevel::Error);
        assert_eq!(StatusMessage::success("x").level, LogLevel::Success);
    }
}
