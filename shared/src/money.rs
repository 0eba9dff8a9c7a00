//! Money conversion helpers
//!
//! All amounts exchanged with the payment processor are integer minor
//! units (cents). Everything else in the system carries `Decimal` major
//! units. Conversion rounds half-up to the nearest cent.

use crate::error::PosError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Convert a major-unit amount to integer minor units, round-half-up.
///
/// Fails on negative amounts and on amounts too large for i64.
pub fn to_minor_units(amount: Decimal) -> Result<i64, PosError> {
    if amount < Decimal::ZERO {
        return Err(PosError::validation(format!(
            "amount must not be negative: {amount}"
        )));
    }
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| PosError::validation(format!("amount out of range: {amount}")))
}

/// Convert integer minor units back to a major-unit decimal
pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, 2)
}
