//! Checkout endpoints
//!
//! The operator console drives the single checkout session through these
//! routes: cart edits, the precondition-gated begin, receipt choice +
//! terminal submit, manual status polls, and reset.

use crate::checkout::{self, CheckoutSession, CheckoutState};
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::cart::{Cart, QuantityAction};
use shared::error::{ApiResponse, PosError, StatusMessage};
use shared::payment::TerminalReader;

/// Session snapshot returned by every checkout endpoint
#[derive(Debug, Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub state: CheckoutState,
    pub cart: Cart,
    pub total: Decimal,
    pub reader: Option<TerminalReader>,
    pub message: StatusMessage,
}

impl SessionView {
    fn of(session: &CheckoutSession, state: &AppState) -> Self {
        Self {
            state: session.state().clone(),
            cart: session.cart.clone(),
            total: session.cart.total(&state.catalog),
            reader: session.reader().cloned(),
            message: session.message().clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CartUpdate {
    pub product_id: String,
    pub action: QuantityAction,
}

#[derive(Debug, Deserialize)]
pub struct SurchargeUpdate {
    pub amount: Decimal,
}

#[derive(Debug, Deserialize, Default)]
pub struct ReceiptChoice {
    #[serde(default)]
    pub email: Option<String>,
}

/// GET /api/checkout — current session state
pub async fn view(State(state): State<AppState>) -> ApiResponse<SessionView> {
    let session = state.checkout.lock().await;
    ApiResponse::success(SessionView::of(&session, &state))
}

/// POST /api/checkout/cart — increment/decrement one product
pub async fn update_cart(
    State(state): State<AppState>,
    Json(update): Json<CartUpdate>,
) -> Result<ApiResponse<SessionView>, PosError> {
    if !state.catalog.iter().any(|p| p.id == update.product_id) {
        return Err(PosError::validation(format!(
            "unknown product: {}",
            update.product_id
        )));
    }
    let mut session = state.checkout.lock().await;
    if session.busy() {
        return Err(PosError::validation(
            "cannot edit the cart while a checkout is in progress",
        ));
    }
    session.cart.apply(&update.product_id, update.action);
    Ok(ApiResponse::success(SessionView::of(&session, &state)))
}

/// PUT /api/checkout/surcharge — set the manual surcharge
pub async fn set_surcharge(
    State(state): State<AppState>,
    Json(update): Json<SurchargeUpdate>,
) -> Result<ApiResponse<SessionView>, PosError> {
    let mut session = state.checkout.lock().await;
    if session.busy() {
        return Err(PosError::validation(
            "cannot edit the cart while a checkout is in progress",
        ));
    }
    session.cart.set_additional_charges(update.amount);
    Ok(ApiResponse::success(SessionView::of(&session, &state)))
}

/// POST /api/checkout — precondition gate into the receipt prompt
pub async fn begin(
    State(state): State<AppState>,
) -> Result<ApiResponse<SessionView>, PosError> {
    let mut session = state.checkout.lock().await;
    let message =
        checkout::begin_checkout(&mut session, &state.catalog, state.gateway.as_ref()).await?;
    Ok(ApiResponse::info(
        message.message,
        SessionView::of(&session, &state),
    ))
}

/// POST /api/checkout/payment — receipt choice, then dispatch to the
/// terminal
pub async fn submit_payment(
    State(state): State<AppState>,
    Json(choice): Json<ReceiptChoice>,
) -> Result<ApiResponse<SessionView>, PosError> {
    let mut session = state.checkout.lock().await;
    let message = checkout::submit_payment(
        &mut session,
        &state.catalog,
        state.gateway.as_ref(),
        &state.currency,
        choice.email,
    )
    .await?;
    Ok(ApiResponse::info(
        message.message,
        SessionView::of(&session, &state),
    ))
}

/// POST /api/checkout/status — manual status poll
pub async fn check_status(
    State(state): State<AppState>,
) -> Result<ApiResponse<SessionView>, PosError> {
    let mut session = state.checkout.lock().await;
    let message = checkout::check_status(&mut session, state.gateway.as_ref()).await?;
    let view = SessionView::of(&session, &state);
    Ok(ApiResponse {
        level: message.level,
        message: message.message,
        data: Some(view),
        code: None,
    })
}

/// POST /api/checkout/reset — back to Idle, cart zeroed
pub async fn reset(State(state): State<AppState>) -> ApiResponse<SessionView> {
    let mut session = state.checkout.lock().await;
    session.reset();
    ApiResponse::success_with_message("session reset", SessionView::of(&session, &state))
}
