//! Capture and delivery sagas for already-placed orders
//!
//! Both run independently of the in-person checkout machine. Capture is a
//! two-step saga: charge at the processor, then best-effort record the
//! outcome upstream. The second step never rolls back the first.

use crate::gateway::PaymentGateway;
use crate::recon::OrdersApi;
use dashmap::DashSet;
use shared::error::PosError;
use shared::money::to_minor_units;
use shared::order::Order;
use shared::payment::PaymentIntentRef;
use std::sync::Arc;

/// Per-order in-flight markers. A duplicate action on an order whose
/// capture/delivery is still running is a no-op, not a second request.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    ids: Arc<DashSet<String>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an order as in flight; `None` when it already is. The marker
    /// clears when the returned token drops.
    pub fn try_acquire(&self, order_id: &str) -> Option<InFlightToken> {
        if self.ids.insert(order_id.to_string()) {
            Some(InFlightToken {
                ids: Arc::clone(&self.ids),
                order_id: order_id.to_string(),
            })
        } else {
            None
        }
    }
}

/// RAII marker for one order's in-flight action
#[derive(Debug)]
pub struct InFlightToken {
    ids: Arc<DashSet<String>>,
    order_id: String,
}

impl Drop for InFlightToken {
    fn drop(&mut self) {
        self.ids.remove(&self.order_id);
    }
}

/// Outcome of the capture saga
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureResult {
    /// The processor already reports this payment captured; no call made
    AlreadyCaptured,
    /// Captured at the processor. `warning` is set when the follow-up
    /// order update failed; the capture itself still succeeded.
    Captured {
        intent: PaymentIntentRef,
        warning: Option<String>,
    },
}

/// Collect payment for an already-placed order.
///
/// A stored intent id takes precedence over an off-session charge:
/// capturing the existing authorization can never double-charge, while a
/// fresh off-session create could.
pub async fn collect_payment<G: PaymentGateway, O: OrdersApi>(
    order: &Order,
    currency: &str,
    gateway: &G,
    orders: &O,
) -> Result<CaptureResult, PosError> {
    // 1. Never capture twice.
    if order.payment_succeeded() {
        return Ok(CaptureResult::AlreadyCaptured);
    }

    // 2. Charge at the processor. On failure nothing is recorded upstream
    //    and the order's stored payment status stays untouched.
    let intent = match (&order.stripe_payment_intent_id, &order.stripe_customer_id) {
        (Some(intent_id), _) => gateway.capture_existing_intent(intent_id).await,
        (None, Some(customer_id)) => {
            let Some(payment_method_id) = order.stripe_payment_method_id.as_deref() else {
                return Err(PosError::validation(format!(
                    "order {} has no saved payment method",
                    order.id
                )));
            };
            let amount = to_minor_units(order.total_amount)?;
            gateway
                .capture_off_session(customer_id, payment_method_id, amount, currency, &order.id)
                .await
        }
        (None, None) => {
            return Err(PosError::validation(format!(
                "order {} has no capturable payment",
                order.id
            )));
        }
    }
    .map_err(|e| {
        if e.requires_authentication() {
            tracing::warn!(order_id = %order.id, "saved payment method requires authentication");
        }
        PosError::from(e)
    })?;

    tracing::info!(order_id = %order.id, intent_id = %intent.id, status = %intent.status, "payment captured");

    // 3. Best-effort side update; its failure is a secondary warning and
    //    never unwinds the capture.
    let warning = match orders
        .record_payment_outcome(&order.id, &intent.id, intent.status.as_str())
        .await
    {
        Ok(()) => None,
        Err(e) => {
            tracing::warn!(order_id = %order.id, error = %e, "payment captured but order update failed");
            Some(PosError::Reconciliation(e.to_string()).to_string())
        }
    };

    Ok(CaptureResult::Captured { intent, warning })
}

/// Mark an order delivered. Independent of the capture saga; on failure
/// the stored status stays untouched and the error is reported.
pub async fn mark_delivered<O: OrdersApi>(order_id: &str, orders: &O) -> Result<(), PosError> {
    orders
        .mark_delivered(order_id)
        .await
        .map_err(PosError::from)?;
    tracing::info!(order_id = %order_id, "order marked delivered");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{GatewayError, GatewayResult};
    use crate::recon::{UpstreamError, UpstreamResult};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use shared::order::{Customer, OrderStatus, Subscription};
    use shared::payment::{PaymentIntentStatus, TerminalReader};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeGateway {
        captures: AtomicUsize,
        off_sessions: Mutex<Vec<(String, String, i64)>>,
        capture_error: Option<GatewayError>,
    }

    #[async_trait]
    impl PaymentGateway for FakeGateway {
        async fn list_readers(&self) -> GatewayResult<Vec<TerminalReader>> {
            Ok(vec![])
        }

        async fn create_customer(&self, _email: &str) -> GatewayResult<String> {
            unreachable!("capture saga never creates customers")
        }

        async fn create_and_dispatch_intent(
            &self,
            _amount_minor: i64,
            _currency: &str,
            _reader_id: &str,
            _customer_id: Option<&str>,
        ) -> GatewayResult<PaymentIntentRef> {
            unreachable!("capture saga never dispatches to a reader")
        }

        async fn retrieve_status(&self, intent_id: &str) -> GatewayResult<PaymentIntentRef> {
            Err(GatewayError::NotFound(intent_id.to_string()))
        }

        async fn capture_off_session(
            &self,
            customer_id: &str,
            payment_method_id: &str,
            amount_minor: i64,
            _currency: &str,
            _order_id: &str,
        ) -> GatewayResult<PaymentIntentRef> {
            self.off_sessions.lock().unwrap().push((
                customer_id.to_string(),
                payment_method_id.to_string(),
                amount_minor,
            ));
            Ok(succeeded_intent("pi_off", amount_minor))
        }

        async fn capture_existing_intent(
            &self,
            intent_id: &str,
        ) -> GatewayResult<PaymentIntentRef> {
            if let Some(err) = &self.capture_error {
                return Err(err.clone());
            }
            self.captures.fetch_add(1, Ordering::SeqCst);
            Ok(succeeded_intent(intent_id, 1250))
        }
    }

    #[derive(Default)]
    struct FakeOrders {
        delivered: Mutex<Vec<String>>,
        outcomes: Mutex<Vec<(String, String, String)>>,
        outcome_error: bool,
        delivered_error: Option<UpstreamError>,
    }

    #[async_trait]
    impl OrdersApi for FakeOrders {
        async fn list_orders(&self) -> UpstreamResult<Vec<Order>> {
            Ok(vec![])
        }

        async fn list_subscriptions(&self) -> UpstreamResult<Vec<Subscription>> {
            Ok(vec![])
        }

        async fn list_customers(&self) -> UpstreamResult<Vec<Customer>> {
            Ok(vec![])
        }

        async fn mark_delivered(&self, order_id: &str) -> UpstreamResult<()> {
            if let Some(err) = &self.delivered_error {
                return Err(err.clone());
            }
            self.delivered.lock().unwrap().push(order_id.to_string());
            Ok(())
        }

        async fn record_payment_outcome(
            &self,
            order_id: &str,
            payment_intent_id: &str,
            payment_status: &str,
        ) -> UpstreamResult<()> {
            if self.outcome_error {
                return Err(UpstreamError::Network("connection refused".to_string()));
            }
            self.outcomes.lock().unwrap().push((
                order_id.to_string(),
                payment_intent_id.to_string(),
                payment_status.to_string(),
            ));
            Ok(())
        }
    }

    fn succeeded_intent(id: &str, amount: i64) -> PaymentIntentRef {
        PaymentIntentRef {
            id: id.to_string(),
            status: PaymentIntentStatus::Succeeded,
            amount,
            currency: "usd".to_string(),
            customer: None,
        }
    }

    fn order(id: &str) -> Order {
        Order {
            id: id.to_string(),
            customer_name: None,
            customer_email: None,
            items: vec![],
            total_amount: Decimal::new(1250, 2),
            delivery_date: None,
            status: OrderStatus::Confirmed,
            stripe_customer_id: None,
            stripe_payment_intent_id: None,
            stripe_payment_method_id: None,
            stripe_payment_status: None,
        }
    }

    #[tokio::test]
    async fn test_already_captured_is_a_no_op() {
        let gateway = FakeGateway::default();
        let orders = FakeOrders::default();
        let mut captured = order("ord_1");
        captured.stripe_payment_status = Some(PaymentIntentStatus::Succeeded);
        captured.stripe_payment_intent_id = Some("pi_1".to_string());

        let result = collect_payment(&captured, "usd", &gateway, &orders)
            .await
            .unwrap();
        assert_eq!(result, CaptureResult::AlreadyCaptured);
        // No duplicate capture call was issued.
        assert_eq!(gateway.captures.load(Ordering::SeqCst), 0);
        assert!(orders.outcomes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_existing_intent_takes_precedence() {
        let gateway = FakeGateway::default();
        let orders = FakeOrders::default();
        let mut both = order("ord_2");
        both.stripe_payment_intent_id = Some("pi_2".to_string());
        both.stripe_customer_id = Some("cus_2".to_string());
        both.stripe_payment_method_id = Some("pm_2".to_string());

        collect_payment(&both, "usd", &gateway, &orders).await.unwrap();
        assert_eq!(gateway.captures.load(Ordering::SeqCst), 1);
        assert!(gateway.off_sessions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_off_session_fallback_converts_amount() {
        let gateway = FakeGateway::default();
        let orders = FakeOrders::default();
        let mut saved_method = order("ord_3");
        saved_method.stripe_customer_id = Some("cus_3".to_string());
        saved_method.stripe_payment_method_id = Some("pm_3".to_string());

        collect_payment(&saved_method, "usd", &gateway, &orders)
            .await
            .unwrap();
        let off_sessions = gateway.off_sessions.lock().unwrap();
        assert_eq!(off_sessions.len(), 1);
        // $12.50 charged as 1250 minor units.
        assert_eq!(off_sessions[0], ("cus_3".to_string(), "pm_3".to_string(), 1250));
    }

    #[tokio::test]
    async fn test_no_capturable_payment_is_validation_error() {
        let gateway = FakeGateway::default();
        let orders = FakeOrders::default();
        let err = collect_payment(&order("ord_4"), "usd", &gateway, &orders)
            .await
            .unwrap_err();
        assert!(matches!(err, PosError::Validation(_)));
    }

    #[tokio::test]
    async fn test_gateway_failure_records_nothing_upstream() {
        let gateway = FakeGateway {
            capture_error: Some(GatewayError::Api {
                code: Some("payment_intent_unexpected_state".to_string()),
                message: "This intent cannot be captured.".to_string(),
            }),
            ..Default::default()
        };
        let orders = FakeOrders::default();
        let mut with_intent = order("ord_5");
        with_intent.stripe_payment_intent_id = Some("pi_5".to_string());

        let err = collect_payment(&with_intent, "usd", &gateway, &orders)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "This intent cannot be captured.");
        assert!(orders.outcomes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_failure_is_warning_not_capture_failure() {
        let gateway = FakeGateway::default();
        let orders = FakeOrders {
            outcome_error: true,
            ..Default::default()
        };
        let mut with_intent = order("ord_6");
        with_intent.stripe_payment_intent_id = Some("pi_6".to_string());

        // The capture still reports success; the failed side update only
        // produces a warning.
        match collect_payment(&with_intent, "usd", &gateway, &orders)
            .await
            .unwrap()
        {
            CaptureResult::Captured { intent, warning } => {
                assert_eq!(intent.id, "pi_6");
                let warning = warning.expect("expected a reconciliation warning");
                assert!(warning.contains("order update failed"));
            }
            other => panic!("expected captured result, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_mark_delivered_passes_through_upstream_rejection() {
        let orders = FakeOrders {
            delivered_error: Some(UpstreamError::Status {
                status: 409,
                body: "already delivered".to_string(),
            }),
            ..Default::default()
        };
        let err = mark_delivered("ord_7", &orders).await.unwrap_err();
        match err {
            PosError::Upstream { status, message } => {
                assert_eq!(status, Some(409));
                assert!(message.contains("already delivered"));
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_mark_delivered_success() {
        let orders = FakeOrders::default();
        mark_delivered("ord_8", &orders).await.unwrap();
        assert_eq!(orders.delivered.lock().unwrap().as_slice(), ["ord_8"]);
    }

    #[test]
    fn test_in_flight_guard_blocks_duplicates_until_drop() {
        let guard = InFlight::new();
        let token = guard.try_acquire("ord_9").expect("first acquire");
        assert!(guard.try_acquire("ord_9").is_none());
        // A different order is unaffected.
        assert!(guard.try_acquire("ord_10").is_some());
        drop(token);
        assert!(guard.try_acquire("ord_9").is_some());
    }
}
