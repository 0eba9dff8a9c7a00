//! Stripe integration via REST API (no SDK dependency)
//!
//! Form-encoded requests with basic auth against `api.stripe.com`.
//! Amounts cross this boundary as integer minor units only.

use super::{GatewayError, GatewayResult, PaymentGateway};
use async_trait::async_trait;
use serde::Deserialize;
use shared::payment::{PaymentIntentRef, TerminalReader};

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Stripe-backed [`PaymentGateway`], constructed once at startup and
/// injected everywhere it is needed
#[derive(Debug, Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ReaderList {
    #[serde(default)]
    data: Vec<TerminalReader>,
}

#[derive(Debug, Deserialize)]
struct CustomerResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

/// Turn a non-2xx processor response body into a `GatewayError::Api`,
/// keeping the processor's code and message verbatim
fn parse_api_error(status: u16, body: &str) -> GatewayError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => GatewayError::Api {
            code: envelope.error.code,
            message: envelope
                .error
                .message
                .unwrap_or_else(|| format!("payment processor error (HTTP {status})")),
        },
        Err(_) => GatewayError::Api {
            code: None,
            message: format!("payment processor error (HTTP {status}): {}", body.trim()),
        },
    }
}

impl StripeGateway {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self::with_base_url(secret_key, STRIPE_API_BASE)
    }

    pub fn with_base_url(secret_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: secret_key.into(),
            base_url: base_url.into(),
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        let resp = self
            .client
            .get(format!("{}{path}", self.base_url))
            .basic_auth(&self.secret_key, None::<&str>)
            .send()
            .await?;
        Self::handle_response(resp).await
    }

    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> GatewayResult<T> {
        let resp = self
            .client
            .post(format!("{}{path}", self.base_url))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(params)
            .send()
            .await?;
        Self::handle_response(resp).await
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
    ) -> GatewayResult<T> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(parse_api_error(status.as_u16(), &body));
        }
        resp.json().await.map_err(Into::into)
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn list_readers(&self) -> GatewayResult<Vec<TerminalReader>> {
        let list: ReaderList = self.get("/terminal/readers").await?;
        Ok(list.data)
    }

    async fn create_customer(&self, email: &str) -> GatewayResult<String> {
        let customer: CustomerResponse =
            self.post_form("/customers", &[("email", email)]).await?;
        Ok(customer.id)
    }

    async fn create_and_dispatch_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        reader_id: &str,
        customer_id: Option<&str>,
    ) -> GatewayResult<PaymentIntentRef> {
        let amount = amount_minor.to_string();
        let mut params = vec![
            ("amount", amount.as_str()),
            ("currency", currency),
            ("payment_method_types[]", "card_present"),
            ("capture_method", "automatic"),
        ];
        if let Some(customer) = customer_id {
            params.push(("customer", customer));
        }
        let intent: PaymentIntentRef = self.post_form("/payment_intents", &params).await?;

        // The intent now exists at the processor. A dispatch failure from
        // here on must carry its id so it is never orphaned. The dispatch
        // response is a reader object; only success matters here.
        let dispatch = self
            .post_form::<serde_json::Value>(
                &format!("/terminal/readers/{reader_id}/process_payment_intent"),
                &[("payment_intent", intent.id.as_str())],
            )
            .await;

        match dispatch {
            Ok(_) => Ok(intent),
            Err(GatewayError::Api { code, message }) => Err(GatewayError::Dispatch {
                intent_id: intent.id,
                code,
                message,
            }),
            Err(GatewayError::Network(message)) => Err(GatewayError::Dispatch {
                intent_id: intent.id,
                code: None,
                message,
            }),
            Err(other) => Err(other),
        }
    }

    async fn retrieve_status(&self, intent_id: &str) -> GatewayResult<PaymentIntentRef> {
        match self
            .get::<PaymentIntentRef>(&format!("/payment_intents/{intent_id}"))
            .await
        {
            Err(GatewayError::Api { code, .. })
                if code.as_deref() == Some("resource_missing") =>
            {
                Err(GatewayError::NotFound(intent_id.to_string()))
            }
            other => other,
        }
    }

    async fn capture_off_session(
        &self,
        customer_id: &str,
        payment_method_id: &str,
        amount_minor: i64,
        currency: &str,
        order_id: &str,
    ) -> GatewayResult<PaymentIntentRef> {
        let amount = amount_minor.to_string();
        self.post_form(
            "/payment_intents",
            &[
                ("amount", amount.as_str()),
                ("currency", currency),
                ("customer", customer_id),
                ("payment_method", payment_method_id),
                ("off_session", "true"),
                ("confirm", "true"),
                ("metadata[order_id]", order_id),
                ("metadata[order_type]", "online"),
            ],
        )
        .await
    }

    async fn capture_existing_intent(&self, intent_id: &str) -> GatewayResult<PaymentIntentRef> {
        self.post_form(&format!("/payment_intents/{intent_id}/capture"), &[])
            .await
    }
}
