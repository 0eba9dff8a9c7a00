//! Canonical order model and upstream normalization
//!
//! The order-management API returns loosely structured rows: field names
//! vary across records (`items` vs `order_items`, `unit_cost` vs `price`,
//! camelCase vs snake_case). All of that ambiguity is isolated here: raw
//! row types accept every known variant via serde aliases, and a single
//! mapping per entity produces the canonical shape the rest of the system
//! consumes.

use crate::payment::PaymentIntentStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Delivery status of an order, owned by the order-management system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Lenient parse; unknown strings normalize to `Pending` so one odd
    /// record never fails a whole listing
    pub fn parse(raw: &str) -> Self {
        match raw {
            "confirmed" => Self::Confirmed,
            "delivered" => Self::Delivered,
            "cancelled" | "canceled" => Self::Cancelled,
            _ => Self::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

/// One line of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

/// Canonical order shape consumed by the console
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub delivery_date: Option<String>,
    pub status: OrderStatus,
    pub stripe_customer_id: Option<String>,
    pub stripe_payment_intent_id: Option<String>,
    pub stripe_payment_method_id: Option<String>,
    pub stripe_payment_status: Option<PaymentIntentStatus>,
}

impl Order {
    /// True when the processor already reports this order's payment as
    /// captured; capture actions on such an order are a no-op
    pub fn payment_succeeded(&self) -> bool {
        self.stripe_payment_status == Some(PaymentIntentStatus::Succeeded)
    }
}

/// Canonical subscription shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Option<String>,
    pub customer_name: Option<String>,
    pub email: Option<String>,
    pub status: String,
    /// 0-6, Sunday-Saturday
    pub day_of_week: Option<u8>,
    pub items: Vec<OrderItem>,
    pub total_amount: Option<Decimal>,
    pub stripe_customer_id: Option<String>,
    pub stripe_payment_method_id: Option<String>,
}

/// Canonical customer shape (upstream calls them users)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub stripe_customer_id: Option<String>,
}

// ===== Raw upstream rows =====

fn parse_intent_status(raw: Option<String>) -> Option<PaymentIntentStatus> {
    raw.map(|s| serde_json::from_value(serde_json::Value::String(s)).unwrap_or(PaymentIntentStatus::Unknown))
}

/// Raw order item; some records price the line as `unit_cost`, others as
/// `price`
#[derive(Debug, Clone, Deserialize)]
pub struct RawOrderItem {
    pub name: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default, alias = "unitCost")]
    pub unit_cost: Option<Decimal>,
    #[serde(default, alias = "unitPrice", alias = "unit_price")]
    pub price: Option<Decimal>,
}

impl From<RawOrderItem> for OrderItem {
    fn from(raw: RawOrderItem) -> Self {
        Self {
            name: raw.name,
            quantity: raw.quantity,
            unit_price: raw.unit_cost.or(raw.price).unwrap_or(Decimal::ZERO),
        }
    }
}

/// Raw order row as returned by `GET /orders`
#[derive(Debug, Clone, Deserialize)]
pub struct RawOrder {
    #[serde(alias = "orderId")]
    pub id: String,
    #[serde(default, alias = "customerName")]
    pub customer_name: Option<String>,
    #[serde(default, alias = "customerEmail", alias = "email")]
    pub customer_email: Option<String>,
    /// Items nest under `items` in newer records, `order_items` in older
    #[serde(default, alias = "order_items", alias = "orderItems")]
    pub items: Vec<RawOrderItem>,
    #[serde(default, alias = "totalAmount")]
    pub total_amount: Decimal,
    #[serde(default, alias = "deliveryDate")]
    pub delivery_date: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "stripeCustomerId")]
    pub stripe_customer_id: Option<String>,
    #[serde(
        default,
        alias = "stripePaymentIntentId",
        alias = "payment_intent_id",
        alias = "paymentIntentId"
    )]
    pub stripe_payment_intent_id: Option<String>,
    #[serde(default, alias = "stripePaymentMethodId")]
    pub stripe_payment_method_id: Option<String>,
    #[serde(default, alias = "stripePaymentStatus", alias = "payment_status")]
    pub stripe_payment_status: Option<String>,
}

impl From<RawOrder> for Order {
    fn from(raw: RawOrder) -> Self {
        Self {
            id: raw.id,
            customer_name: raw.customer_name,
            customer_email: raw.customer_email,
            items: raw.items.into_iter().map(OrderItem::from).collect(),
            total_amount: raw.total_amount,
            // Records without an explicit delivery date fall back to the
            // order creation date, matching how the console groups them.
            delivery_date: raw.delivery_date.or(raw.created_at),
            status: raw
                .status
                .as_deref()
                .map(OrderStatus::parse)
                .unwrap_or(OrderStatus::Pending),
            stripe_customer_id: raw.stripe_customer_id,
            stripe_payment_intent_id: raw.stripe_payment_intent_id,
            stripe_payment_method_id: raw.stripe_payment_method_id,
            stripe_payment_status: parse_intent_status(raw.stripe_payment_status),
        }
    }
}

/// Raw subscription row as returned by `GET /subscriptions` (camelCase)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSubscription {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "default_subscription_status")]
    pub status: String,
    #[serde(default)]
    pub day_of_week: Option<u8>,
    #[serde(default)]
    pub items: Vec<RawOrderItem>,
    #[serde(default)]
    pub total_amount: Option<Decimal>,
    #[serde(default)]
    pub stripe_customer_id: Option<String>,
    #[serde(default)]
    pub stripe_payment_method_id: Option<String>,
}

fn default_subscription_status() -> String {
    "active".to_string()
}

impl From<RawSubscription> for Subscription {
    fn from(raw: RawSubscription) -> Self {
        Self {
            id: raw.id,
            customer_name: raw.customer_name,
            email: raw.email,
            status: raw.status,
            day_of_week: raw.day_of_week,
            items: raw.items.into_iter().map(OrderItem::from).collect(),
            total_amount: raw.total_amount,
            stripe_customer_id: raw.stripe_customer_id,
            stripe_payment_method_id: raw.stripe_payment_method_id,
        }
    }
}

/// Raw customer/user row as returned by `GET /users`
#[derive(Debug, Clone, Deserialize)]
pub struct RawCustomer {
    #[serde(default, alias = "userId")]
    pub id: Option<String>,
    #[serde(default, alias = "customerName", alias = "customer_name")]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "stripeCustomerId")]
    pub stripe_customer_id: Option<String>,
}

impl From<RawCustomer> for Customer {
    fn from(raw: RawCustomer) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            email: raw.email,
            stripe_customer_id: raw.stripe_customer_id,
        }
    }
}
