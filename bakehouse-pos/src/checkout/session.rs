//! Checkout state machine
//!
//! One session per operator. States per checkout attempt:
//!
//! `Idle -> AwaitingReceiptChoice -> Submitting ->
//!  AwaitingTerminalConfirmation -> Resolved(success|failed)`
//!
//! Transitions are pure; the async orchestration that drives them against
//! the gateway lives in the parent module. Every retry is
//! operator-initiated, never automatic.

use rust_decimal::Decimal;
use serde::Serialize;
use shared::cart::Cart;
use shared::catalog::Product;
use shared::error::{PosError, StatusMessage};
use shared::payment::{PaymentIntentStatus, ReaderStatus, TerminalReader};
use shared::util::is_valid_email;

/// Minimum chargeable total: the processor rejects anything at or below
/// $0.50
pub const MIN_CHECKOUT_TOTAL: Decimal = Decimal::from_parts(50, 0, 0, false, 2);

/// State of the current checkout attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CheckoutState {
    Idle,
    AwaitingReceiptChoice,
    Submitting,
    AwaitingTerminalConfirmation { intent_id: String },
    Resolved { success: bool },
}

/// One operator's checkout session: cart plus the current attempt
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub cart: Cart,
    state: CheckoutState,
    reader: Option<TerminalReader>,
    message: StatusMessage,
}

impl CheckoutSession {
    pub fn new(catalog: &[Product]) -> Self {
        Self {
            cart: Cart::new(catalog),
            state: CheckoutState::Idle,
            reader: None,
            message: StatusMessage::info(""),
        }
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    pub fn message(&self) -> &StatusMessage {
        &self.message
    }

    pub fn reader(&self) -> Option<&TerminalReader> {
        self.reader.as_ref()
    }

    /// True from the receipt prompt on: the cart must not change once
    /// the precondition gate has passed
    pub fn busy(&self) -> bool {
        matches!(
            self.state,
            CheckoutState::AwaitingReceiptChoice
                | CheckoutState::Submitting
                | CheckoutState::AwaitingTerminalConfirmation { .. }
        )
    }

    /// Local begin gates: no attempt in flight, total above the minimum.
    /// Needs nothing from the processor.
    pub fn ensure_can_begin(&self, total: Decimal) -> Result<(), PosError> {
        if self.busy() {
            return Err(PosError::validation("a checkout is already in progress"));
        }
        if total <= MIN_CHECKOUT_TOTAL {
            return Err(PosError::validation(
                "total amount must be greater than $0.50",
            ));
        }
        Ok(())
    }

    /// `Idle -> AwaitingReceiptChoice`
    ///
    /// Each unmet precondition reports its own validation message and
    /// leaves the machine in `Idle`.
    pub fn begin(
        &mut self,
        total: Decimal,
        reader: Option<TerminalReader>,
    ) -> Result<(), PosError> {
        self.ensure_can_begin(total)?;
        let Some(reader) = reader else {
            return Err(PosError::validation(
                "no terminal reader available; check the terminal connection",
            ));
        };
        if reader.status != ReaderStatus::Online {
            return Err(PosError::validation(format!(
                "reader must be online (currently {})",
                reader.status
            )));
        }
        self.reader = Some(reader);
        self.state = CheckoutState::AwaitingReceiptChoice;
        self.message = StatusMessage::info("choose a receipt option");
        Ok(())
    }

    /// `AwaitingReceiptChoice -> Submitting`
    ///
    /// Returns the normalized receipt email: an invalid-format address is
    /// treated the same as "no email" rather than blocking checkout.
    pub fn choose_receipt(&mut self, email: Option<String>) -> Result<Option<String>, PosError> {
        if self.state != CheckoutState::AwaitingReceiptChoice {
            return Err(PosError::validation("checkout has not been started"));
        }
        self.state = CheckoutState::Submitting;
        Ok(email
            .map(|e| e.trim().to_lowercase())
            .filter(|e| is_valid_email(e)))
    }

    /// `Submitting -> AwaitingTerminalConfirmation`: intent created and
    /// dispatched; the id is the sole handle for later status checks
    pub fn submitted(&mut self, intent_id: String) {
        self.state = CheckoutState::AwaitingTerminalConfirmation { intent_id };
        self.message = StatusMessage::info("payment processing - check terminal");
    }

    /// `Submitting -> Resolved(failed)`: the gateway's message is kept
    /// verbatim for the operator
    pub fn submit_failed(&mut self, error: &PosError) {
        self.state = CheckoutState::Resolved { success: false };
        self.message = error.status_message();
    }

    /// The intent id to poll, when a terminal confirmation is pending
    pub fn pending_intent(&self) -> Option<&str> {
        match &self.state {
            CheckoutState::AwaitingTerminalConfirmation { intent_id } => Some(intent_id),
            _ => None,
        }
    }

    /// `AwaitingTerminalConfirmation -> Resolved(success)` on `succeeded`;
    /// any other status is informational and the operator may poll again
    pub fn record_poll(&mut self, status: PaymentIntentStatus) {
        if status == PaymentIntentStatus::Succeeded {
            self.state = CheckoutState::Resolved { success: true };
            self.message = StatusMessage::success("succeeded");
        } else {
            self.message = StatusMessage::info(status.to_string());
        }
    }

    /// `Resolved(*) -> Idle`, zeroing the cart
    pub fn reset(&mut self) {
        self.cart.reset();
        self.reader = None;
        self.state = CheckoutState::Idle;
        self.message = StatusMessage::info("");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::catalog::default_catalog;
    use shared::error::LogLevel;

    fn online_reader() -> TerminalReader {
        TerminalReader {
            id: "tmr_1".to_string(),
            label: "Counter".to_string(),
            status: ReaderStatus::Online,
        }
    }

    fn offline_reader() -> TerminalReader {
        TerminalReader {
            status: ReaderStatus::Offline,
            ..online_reader()
        }
    }

    #[test]
    fn test_begin_rejects_low_total() {
        let mut session = CheckoutSession::new(&default_catalog());
        let err = session
            .begin(Decimal::new(50, 2), Some(online_reader()))
            .unwrap_err();
        assert!(err.to_string().contains("$0.50"));
        assert_eq!(session.state(), &CheckoutState::Idle);
    }

    #[test]
    fn test_begin_rejects_missing_reader() {
        let mut session = CheckoutSession::new(&default_catalog());
        let err = session.begin(Decimal::new(12, 0), None).unwrap_err();
        assert!(err.to_string().contains("no terminal reader"));
        assert_eq!(session.state(), &CheckoutState::Idle);
    }

    #[test]
    fn test_begin_rejects_offline_reader() {
        let mut session = CheckoutSession::new(&default_catalog());
        let err = session
            .begin(Decimal::new(12, 0), Some(offline_reader()))
            .unwrap_err();
        assert!(err.to_string().contains("reader must be online"));
        assert_eq!(session.state(), &CheckoutState::Idle);
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut session = CheckoutSession::new(&default_catalog());
        session
            .begin(Decimal::new(12, 0), Some(online_reader()))
            .unwrap();
        assert_eq!(session.state(), &CheckoutState::AwaitingReceiptChoice);

        let email = session
            .choose_receipt(Some("Ada@Example.com ".to_string()))
            .unwrap();
        assert_eq!(email.as_deref(), Some("ada@example.com"));
        assert_eq!(session.state(), &CheckoutState::Submitting);

        session.submitted("pi_123".to_string());
        assert_eq!(session.pending_intent(), Some("pi_123"));
        assert!(session.busy());

        session.record_poll(PaymentIntentStatus::Processing);
        assert_eq!(session.message().level, LogLevel::Info);
        assert_eq!(session.pending_intent(), Some("pi_123"));

        session.record_poll(PaymentIntentStatus::Succeeded);
        assert_eq!(session.state(), &CheckoutState::Resolved { success: true });
        assert_eq!(session.message().level, LogLevel::Success);
    }

    #[test]
    fn test_invalid_email_treated_as_none() {
        let mut session = CheckoutSession::new(&default_catalog());
        session
            .begin(Decimal::new(12, 0), Some(online_reader()))
            .unwrap();
        let email = session
            .choose_receipt(Some("not-an-email".to_string()))
            .unwrap();
        assert!(email.is_none());
        // Checkout was not blocked.
        assert_eq!(session.state(), &CheckoutState::Submitting);
    }

    #[test]
    fn test_submit_failure_resolves_failed_with_verbatim_message() {
        let mut session = CheckoutSession::new(&default_catalog());
        session
            .begin(Decimal::new(12, 0), Some(online_reader()))
            .unwrap();
        session.choose_receipt(None).unwrap();
        let err = PosError::gateway(Some("card_declined".to_string()), "Your card was declined.");
        session.submit_failed(&err);
        assert_eq!(session.state(), &CheckoutState::Resolved { success: false });
        assert_eq!(session.message().message, "Your card was declined.");
        assert_eq!(session.message().level, LogLevel::Error);
    }

    #[test]
    fn test_receipt_prompt_is_modal() {
        let mut session = CheckoutSession::new(&default_catalog());
        session
            .begin(Decimal::new(12, 0), Some(online_reader()))
            .unwrap();
        // The cart is frozen from the receipt prompt on: the total the
        // gate approved is the total that gets dispatched.
        assert!(session.busy());
        let err = session
            .begin(Decimal::new(12, 0), Some(online_reader()))
            .unwrap_err();
        assert!(err.to_string().contains("already in progress"));
    }

    #[test]
    fn test_cannot_begin_while_awaiting_terminal() {
        let mut session = CheckoutSession::new(&default_catalog());
        session
            .begin(Decimal::new(12, 0), Some(online_reader()))
            .unwrap();
        session.choose_receipt(None).unwrap();
        session.submitted("pi_1".to_string());
        let err = session
            .begin(Decimal::new(12, 0), Some(online_reader()))
            .unwrap_err();
        assert!(err.to_string().contains("already in progress"));
    }

    #[test]
    fn test_reset_returns_to_idle_and_zeroes_cart() {
        let catalog = default_catalog();
        let mut session = CheckoutSession::new(&catalog);
        session.cart.apply("small_bread", shared::cart::QuantityAction::Increment);
        session
            .begin(Decimal::new(12, 0), Some(online_reader()))
            .unwrap();
        session.choose_receipt(None).unwrap();
        session.submitted("pi_1".to_string());
        session.record_poll(PaymentIntentStatus::Succeeded);
        session.reset();
        assert_eq!(session.state(), &CheckoutState::Idle);
        assert_eq!(session.cart.total(&catalog), Decimal::ZERO);
        assert!(session.reader().is_none());
    }

    #[test]
    fn test_min_total_constant_is_fifty_cents() {
        assert_eq!(MIN_CHECKOUT_TOTAL, Decimal::new(50, 2));
    }
}
