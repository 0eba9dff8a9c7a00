//! Product catalog
//!
//! The catalog is static: defined at process start, immutable for the
//! lifetime of a session.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A sellable product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Price per unit in major units (never negative)
    pub unit_cost: Decimal,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, unit_cost: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_cost,
        }
    }
}

/// Built-in bakery catalog, used when no catalog file is configured
pub fn default_catalog() -> Vec<Product> {
    vec![
        Product::new("small_soup", "Small Soup", Decimal::new(5, 0)),
        Product::new("large_soup", "Large Soup", Decimal::new(8, 0)),
        Product::new("small_bread", "Small Bread", Decimal::new(4, 0)),
        Product::new("large_bread", "Large Bread", Decimal::new(8, 0)),
    ]
}
