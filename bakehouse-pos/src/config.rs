//! Service configuration

use shared::catalog::{default_catalog, Product};
use shared::error::PosError;

/// POS service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Stripe secret API key (env: STRIPE_API_KEY, required)
    pub stripe_api_key: String,
    /// Order-management API base URL (env: ORDERS_API_URL, required)
    pub orders_api_url: String,
    /// HTTP port (env: HTTP_PORT)
    pub http_port: u16,
    /// Currency for in-person charges (env: CURRENCY)
    pub currency: String,
    /// Product catalog, loaded once at startup
    pub catalog: Vec<Product>,
}

impl Config {
    /// A required env var; absence produces a named configuration error
    /// instead of a generic failure deep inside a request.
    fn require(name: &str) -> Result<String, PosError> {
        match std::env::var(name) {
            Ok(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(PosError::config(format!("{name} must be set"))),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, PosError> {
        Ok(Self {
            stripe_api_key: Self::require("STRIPE_API_KEY")?,
            orders_api_url: Self::require("ORDERS_API_URL")?,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            currency: std::env::var("CURRENCY").unwrap_or_else(|_| "usd".into()),
            catalog: Self::load_catalog()?,
        })
    }

    /// Catalog from CATALOG_PATH when set, built-in default otherwise
    fn load_catalog() -> Result<Vec<Product>, PosError> {
        match std::env::var("CATALOG_PATH") {
            Ok(path) => {
                let raw = std::fs::read_to_string(&path)
                    .map_err(|e| PosError::config(format!("cannot read CATALOG_PATH {path}: {e}")))?;
                let catalog: Vec<Product> = serde_json::from_str(&raw)
                    .map_err(|e| PosError::config(format!("invalid catalog file {path}: {e}")))?;
                if catalog.is_empty() {
                    return Err(PosError::config(format!("catalog file {path} is empty")));
                }
                Ok(catalog)
            }
            Err(_) => Ok(default_catalog()),
        }
    }
}
