//! # Error Types
//!
//! Domain-specific error types for rocket-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  rocket-core errors (this file)                                        │
//! │  ├── CoreError        - Cart rule violations                           │
//! │  └── ValidationError  - Malformed input / persisted data               │
//! │                                                                         │
//! │  rocket-db errors (separate crate)                                     │
//! │  └── DbError          - Key-value store failures                       │
//! │                                                                         │
//! │  rocket-cart errors                                                    │
//! │  └── StoreError       - Collaborator failures, wraps the above         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → CartNotice → user    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, stock, amount)
//! 3. Errors are enum variants, never String
//! 4. Rejections are values: callers match on them instead of unwinding

use thiserror::Error;

use crate::types::ProductId;

// =============================================================================
// Core Error
// =============================================================================

/// Cart rule violations.
///
/// These are expected outcomes of a mutation attempt, not bugs. The store
/// turns each of them into a user-facing notice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Requested quantity exceeds the stock observed for this mutation.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart has 2 × product 7
    ///      │
    ///      ▼
    /// add_product(7) → stock oracle says 2
    ///      │
    ///      ▼
    /// OutOfStock { product_id: 7, available: 2, requested: 3 }
    ///      │
    ///      ▼
    /// UI shows: "Quantidade solicitada fora de estoque"
    /// ```
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    OutOfStock {
        product_id: ProductId,
        available: i64,
        requested: i64,
    },

    /// Requested amount is zero or negative.
    #[error("Invalid amount {requested} for product {product_id}")]
    InvalidAmount {
        product_id: ProductId,
        requested: i64,
    },

    /// The product is not in the cart.
    #[error("Product {0} is not in the cart")]
    ProductNotInCart(ProductId),

    /// The product is already in the cart (ids are unique).
    #[error("Product {0} is already in the cart")]
    DuplicateProduct(ProductId),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns true for stock-related rejections, including invalid amounts.
    ///
    /// The user-facing message set reports a zero or negative request the
    /// same way as a request above stock.
    pub fn is_stock_rejection(&self) -> bool {
        matches!(
            self,
            CoreError::OutOfStock { .. } | CoreError::InvalidAmount { .. }
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised when a value entering the core (most often a persisted cart blob)
/// does not meet the cart invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Value must be positive.
    #[error("{field} must be positive, got {value}")]
    MustBePositive { field: String, value: i64 },

    /// Duplicate value (e.g., duplicate product id).
    #[error("{field} '{value}' appears more than once")]
    Duplicate { field: String, value: String },

    /// Invalid format (e.g., not a JSON array of products).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
