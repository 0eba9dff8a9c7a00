//! Shared types for the Bakehouse POS
//!
//! Domain types used across the workspace: product catalog, cart,
//! money conversion, payment-processor reference types, the canonical
//! order model, and the unified error/response system.

pub mod cart;
pub mod catalog;
pub mod error;
pub mod money;
pub mod order;
pub mod payment;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
