//! Online order endpoints
//!
//! Listings plus the two per-order sagas: "Collect Payment" and "Mark as
//! Delivered". Both sagas hold the order's in-flight marker for their
//! duration; a duplicate click while one runs is a no-op.

use crate::checkout::{collect_payment, mark_delivered, CaptureResult};
use crate::recon::OrdersApi;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use shared::error::{ApiResponse, PosError};
use shared::order::{Customer, Order, Subscription};
use shared::payment::PaymentIntentRef;

#[derive(Debug, Deserialize)]
pub struct OrderAction {
    #[serde(alias = "orderId")]
    pub order_id: String,
}

/// GET /api/orders
pub async fn list_orders(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Order>>, PosError> {
    let orders = state.orders.list_orders().await.map_err(PosError::from)?;
    Ok(ApiResponse::success(orders))
}

/// GET /api/subscriptions
pub async fn list_subscriptions(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Subscription>>, PosError> {
    let subscriptions = state
        .orders
        .list_subscriptions()
        .await
        .map_err(PosError::from)?;
    Ok(ApiResponse::success(subscriptions))
}

/// GET /api/users
pub async fn list_customers(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Customer>>, PosError> {
    let customers = state
        .orders
        .list_customers()
        .await
        .map_err(PosError::from)?;
    Ok(ApiResponse::success(customers))
}

/// POST /api/orders/update-status — mark one order delivered
pub async fn update_status(
    State(state): State<AppState>,
    Json(action): Json<OrderAction>,
) -> Result<ApiResponse<()>, PosError> {
    let Some(_token) = state.in_flight.try_acquire(&action.order_id) else {
        return Ok(ApiResponse::info(
            format!("order {} is already being processed", action.order_id),
            (),
        ));
    };
    mark_delivered(&action.order_id, state.orders.as_ref()).await?;
    Ok(ApiResponse::success_with_message(
        format!("order {} marked delivered", action.order_id),
        (),
    ))
}

/// POST /api/orders/capture-payment — capture saga for one order
///
/// The order is re-read from the order-management API so the capture path
/// decision is made against server-side fields, not client-supplied ones.
pub async fn capture_payment(
    State(state): State<AppState>,
    Json(action): Json<OrderAction>,
) -> Result<ApiResponse<PaymentIntentRef>, PosError> {
    let Some(_token) = state.in_flight.try_acquire(&action.order_id) else {
        return Err(PosError::validation(format!(
            "payment for order {} is already being collected",
            action.order_id
        )));
    };

    let order = state
        .orders
        .list_orders()
        .await
        .map_err(PosError::from)?
        .into_iter()
        .find(|o| o.id == action.order_id)
        .ok_or_else(|| PosError::not_found(format!("order {}", action.order_id)))?;

    match collect_payment(
        &order,
        &state.currency,
        state.gateway.as_ref(),
        state.orders.as_ref(),
    )
    .await?
    {
        CaptureResult::AlreadyCaptured => Err(PosError::validation(format!(
            "payment for order {} was already captured",
            order.id
        ))),
        CaptureResult::Captured { intent, warning } => match warning {
            // The capture succeeded; the failed side update is only a
            // dismissable secondary notice.
            Some(warning) => Ok(ApiResponse {
                level: shared::error::LogLevel::Warning,
                message: warning,
                data: Some(intent),
                code: None,
            }),
            None => Ok(ApiResponse::success_with_message(
                format!("payment collected for order {}", order.id),
                intent,
            )),
        },
    }
}
