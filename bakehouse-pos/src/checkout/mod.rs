//! Checkout orchestrator
//!
//! Drives one in-person checkout from "staff presses Checkout" to
//! "payment succeeded or failed" against the payment gateway, and the
//! independent capture/deliver sagas for already-placed orders.
//!
//! Failure semantics: every external error is caught at this boundary and
//! turned into a leveled status message; retries are always
//! operator-initiated.

pub mod saga;
pub mod session;

pub use saga::{collect_payment, mark_delivered, CaptureResult, InFlight};
pub use session::{CheckoutSession, CheckoutState};

use crate::gateway::PaymentGateway;
use shared::catalog::Product;
use shared::error::{PosError, StatusMessage};
use shared::money::to_minor_units;
use shared::payment::TerminalReader;

/// Reader-selection policy: first reader returned (single-reader
/// deployment assumption)
pub fn select_reader(readers: Vec<TerminalReader>) -> Option<TerminalReader> {
    readers.into_iter().next()
}

/// Begin a checkout: validate the total and reader preconditions and move
/// the session to `AwaitingReceiptChoice`
pub async fn begin_checkout<G: PaymentGateway>(
    session: &mut CheckoutSession,
    catalog: &[Product],
    gateway: &G,
) -> Result<StatusMessage, PosError> {
    // 1. The local gates run first so a bad cart never costs a
    //    processor round trip.
    let total = session.cart.total(catalog);
    session.ensure_can_begin(total)?;

    // 2. Enumerate readers; an empty list is a validation failure, not a
    //    gateway one.
    let reader = select_reader(gateway.list_readers().await.map_err(PosError::from)?);

    // 3. Gate on the reader preconditions; each failure names the one
    //    that broke.
    session.begin(total, reader)?;
    Ok(session.message().clone())
}

/// Submit the payment to the terminal: optional receipt customer, then
/// create-and-dispatch. A gateway failure resolves the attempt failed
/// with the processor's message verbatim.
pub async fn submit_payment<G: PaymentGateway>(
    session: &mut CheckoutSession,
    catalog: &[Product],
    gateway: &G,
    currency: &str,
    email: Option<String>,
) -> Result<StatusMessage, PosError> {
    // 1. Receipt choice; invalid email degrades to "no email".
    let email = session.choose_receipt(email)?;

    // 2. The total gate holds at the dispatch boundary too; the cart
    //    may have changed since begin. Amounts cross the gateway as
    //    integer minor units.
    let total = session.cart.total(catalog);
    if total <= session::MIN_CHECKOUT_TOTAL {
        let err = PosError::validation("total amount must be greater than $0.50");
        session.submit_failed(&err);
        return Err(err);
    }
    let amount = match to_minor_units(total) {
        Ok(amount) => amount,
        Err(err) => {
            session.submit_failed(&err);
            return Err(err);
        }
    };

    // 3. Optional processor customer so the terminal can send a receipt.
    let customer_id = match email {
        Some(email) => match gateway.create_customer(&email).await {
            Ok(id) => Some(id),
            Err(e) => {
                let err = PosError::from(e);
                session.submit_failed(&err);
                return Err(err);
            }
        },
        None => None,
    };

    // 4. Create the intent and hand it to the reader.
    let reader_id = session
        .reader()
        .map(|r| r.id.clone())
        .ok_or_else(|| PosError::validation("no terminal reader selected"))?;
    match gateway
        .create_and_dispatch_intent(amount, currency, &reader_id, customer_id.as_deref())
        .await
    {
        Ok(intent) => {
            tracing::info!(intent_id = %intent.id, amount, "payment dispatched to terminal");
            session.submitted(intent.id);
            Ok(session.message().clone())
        }
        Err(e) => {
            if let Some(orphan) = e.created_intent_id() {
                tracing::warn!(intent_id = %orphan, "intent created but not dispatched");
            }
            let err = PosError::from(e);
            session.submit_failed(&err);
            Err(err)
        }
    }
}

/// Operator-initiated status poll; `succeeded` resolves the attempt,
/// anything else is informational
pub async fn check_status<G: PaymentGateway>(
    session: &mut CheckoutSession,
    gateway: &G,
) -> Result<StatusMessage, PosError> {
    let intent_id = session
        .pending_intent()
        .ok_or_else(|| PosError::validation("no payment awaiting confirmation"))?
        .to_string();

    // Status is always re-fetched from the processor, never cached.
    let intent = gateway
        .retrieve_status(&intent_id)
        .await
        .map_err(PosError::from)?;
    session.record_poll(intent.status);
    Ok(session.message().clone())
}
