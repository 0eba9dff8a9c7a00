//! Cart and total calculation
//!
//! The cart maps product ids to non-negative quantities plus one manual
//! surcharge/discount scalar. Quantities are bounded below by zero at the
//! mutation boundary, so `total` never has to defend against negatives.

use crate::catalog::Product;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Quantity change requested by the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantityAction {
    Increment,
    Decrement,
}

/// Operator cart: per-product quantities plus a manual surcharge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    /// Quantity per product id; every catalog product has an entry
    pub quantities: HashMap<String, u32>,
    /// Manual surcharge (or discount when negative upstream allows it)
    pub additional_charges: Decimal,
}

impl Cart {
    /// Create an all-zero cart covering every catalog product
    pub fn new(catalog: &[Product]) -> Self {
        Self {
            quantities: catalog.iter().map(|p| (p.id.clone(), 0)).collect(),
            additional_charges: Decimal::ZERO,
        }
    }

    /// Quantity for a product id; missing entries count as 0
    pub fn quantity(&self, product_id: &str) -> u32 {
        self.quantities.get(product_id).copied().unwrap_or(0)
    }

    /// Apply an increment/decrement, bounded below by zero
    pub fn apply(&mut self, product_id: &str, action: QuantityAction) {
        let entry = self.quantities.entry(product_id.to_string()).or_insert(0);
        match action {
            QuantityAction::Increment => *entry += 1,
            QuantityAction::Decrement => *entry = entry.saturating_sub(1),
        }
    }

    /// Set the manual surcharge
    pub fn set_additional_charges(&mut self, amount: Decimal) {
        self.additional_charges = amount;
    }

    /// Zero all quantities and the surcharge
    pub fn reset(&mut self) {
        for qty in self.quantities.values_mut() {
            *qty = 0;
        }
        self.additional_charges = Decimal::ZERO;
    }

    /// Total in major units: sum of unit_cost * quantity over the catalog,
    /// plus the surcharge. Pure; a product missing from the cart counts
    /// as quantity 0.
    pub fn total(&self, catalog: &[Product]) -> Decimal {
        let items: Decimal = catalog
            .iter()
            .map(|p| p.unit_cost * Decimal::from(self.quantity(&p.id)))
            .sum();
        items + self.additional_charges
    }
}
