//! HTTP client for the order-management API

use super::{OrdersApi, UpstreamError, UpstreamResult};
use async_trait::async_trait;
use serde::Deserialize;
use shared::order::{Customer, Order, RawCustomer, RawOrder, RawSubscription, Subscription};

/// Reqwest-backed [`OrdersApi`] implementation
#[derive(Debug, Clone)]
pub struct OrdersClient {
    client: reqwest::Client,
    base_url: String,
}

// Upstream wraps every listing in a success envelope; rows stay raw
// until normalized into the canonical shapes.

#[derive(Debug, Deserialize)]
struct OrdersEnvelope {
    #[serde(default)]
    orders: Vec<RawOrder>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionsEnvelope {
    #[serde(default)]
    subscriptions: Vec<RawSubscription>,
}

#[derive(Debug, Deserialize)]
struct CustomersEnvelope {
    #[serde(default, alias = "customers")]
    users: Vec<RawCustomer>,
}

impl OrdersClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> UpstreamResult<T> {
        let resp = self.client.get(self.url(path)).send().await?;
        Self::handle_response(resp).await
    }

    async fn put<B: serde::Serialize>(&self, path: &str, body: &B) -> UpstreamResult<()> {
        let resp = self.client.put(self.url(path)).json(body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
    ) -> UpstreamResult<T> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }
        resp.json().await.map_err(Into::into)
    }
}

#[async_trait]
impl OrdersApi for OrdersClient {
    async fn list_orders(&self) -> UpstreamResult<Vec<Order>> {
        let envelope: OrdersEnvelope = self.get("orders").await?;
        Ok(envelope.orders.into_iter().map(Order::from).collect())
    }

    async fn list_subscriptions(&self) -> UpstreamResult<Vec<Subscription>> {
        let envelope: SubscriptionsEnvelope = self.get("subscriptions").await?;
        Ok(envelope
            .subscriptions
            .into_iter()
            .map(Subscription::from)
            .collect())
    }

    async fn list_customers(&self) -> UpstreamResult<Vec<Customer>> {
        let envelope: CustomersEnvelope = self.get("users").await?;
        Ok(envelope.users.into_iter().map(Customer::from).collect())
    }

    async fn mark_delivered(&self, order_id: &str) -> UpstreamResult<()> {
        self.put(
            "orders",
            &serde_json::json!({
                "orderId": order_id,
                "status": "delivered",
            }),
        )
        .await
    }

    async fn record_payment_outcome(
        &self,
        order_id: &str,
        payment_intent_id: &str,
        payment_status: &str,
    ) -> UpstreamResult<()> {
        self.put(
            "orders",
            &serde_json::json!({
                "orderId": order_id,
                "paymentIntentId": payment_intent_id,
                "stripePaymentStatus": payment_status,
            }),
        )
        .await
    }
}
