//! # Store Error Types
//!
//! Error types for cart store operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Store Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Collaborators  │  │   Persistence   │  │     Configuration       │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  StockQuery     │  │  Persistence    │  │  InvalidConfig          │ │
//! │  │  ProductLookup  │  │  Serialization  │  │  InvalidUrl             │ │
//! │  │                 │  │  CorruptState   │  │  ConfigLoad/SaveFailed  │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Rule (wraps rocket_core::CoreError)                            │   │
//! │  │  OutOfStock, InvalidAmount, ProductNotInCart, ...               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of these ever reach a caller of a cart operation: the store maps
//! them to a [`CartNotice`](crate::notify::CartNotice) at its boundary.
//! They do surface from `CartStore::init` and from config loading.

use rocket_core::{CoreError, ProductId};
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store error type covering all possible store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    // =========================================================================
    // Collaborator Errors
    // =========================================================================
    /// The stock oracle could not answer for this product.
    #[error("Stock query failed for product {product_id}: {reason}")]
    StockQuery { product_id: ProductId, reason: String },

    /// The catalog could not return this product.
    #[error("Product lookup failed for product {product_id}: {reason}")]
    ProductLookup { product_id: ProductId, reason: String },

    // =========================================================================
    // Persistence Errors
    // =========================================================================
    /// The key-value store rejected a read or write.
    #[error("Persistence failed: {0}")]
    Persistence(String),

    /// The cart could not be encoded.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// The persisted cart could not be decoded and the policy is `fail`.
    #[error("Persisted cart is corrupt: {0}")]
    CorruptState(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid store configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid API base URL.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Rule Errors
    // =========================================================================
    /// A cart rule rejected the mutation.
    #[error(transparent)]
    Rule(#[from] CoreError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<rocket_db::DbError> for StoreError {
    fn from(err: rocket_db::DbError) -> Self {
        StoreError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for StoreError {
    fn from(err: url::ParseError) -> Self {
        StoreError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for StoreError {
    fn from(err: toml::de::Error) -> Self {
        StoreError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for StoreError {
    fn from(err: toml::ser::Error) -> Self {
        StoreError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl StoreError {
    /// Returns the cart rule behind this error, if it is a rule rejection.
    pub fn rule(&self) -> Option<&CoreError> {
        match self {
            StoreError::Rule(err) => Some(err),
            _ => None,
        }
    }

    /// Returns true if a collaborator (oracle, catalog, key-value store) failed.
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            StoreError::StockQuery { .. }
                | StoreError::ProductLookup { .. }
                | StoreError::Persistence(_)
        )
    }
}
