//! # Validation Module
//!
//! Stock rules and cart invariant checks for Rocket Cart.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Where Each Rule Runs                               │
//! │                                                                         │
//! │  add_product (already in cart)                                         │
//! │  └── check_increment: stock must be strictly greater than current      │
//! │                                                                         │
//! │  update_product_amount                                                 │
//! │  └── check_requested_amount: 1 ≤ requested ≤ stock                     │
//! │                                                                         │
//! │  store initialization (persisted blob)                                 │
//! │  └── validate_products: amount ≥ 1, ids unique                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rocket_core::validation::check_increment;
//! use rocket_core::{ProductId, StockLevel};
//!
//! // 2 in cart, 3 in stock: one more unit fits
//! assert_eq!(check_increment(ProductId(1), 2, StockLevel(3)).unwrap(), 3);
//!
//! // 2 in cart, 2 in stock: rejected
//! assert!(check_increment(ProductId(1), 2, StockLevel(2)).is_err());
//! ```

use std::collections::HashSet;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Product, ProductId, StockLevel};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Stock Rules
// =============================================================================

/// Checks that one more unit of a product already in the cart fits the stock.
///
/// ## Rule
/// The comparison is strict: `stock > current`. A product sitting exactly at
/// the stock ceiling cannot be incremented.
///
/// ## Returns
/// The new amount (`current + 1`) on success.
pub fn check_increment(product_id: ProductId, current: i64, stock: StockLevel) -> CoreResult<i64> {
    if stock.units() > current {
        // stock > current, so current < i64::MAX
        Ok(current + 1)
    } else {
        Err(CoreError::OutOfStock {
            product_id,
            available: stock.units(),
            requested: current.saturating_add(1),
        })
    }
}

/// Checks an explicit amount requested for a product in the cart.
///
/// ## Rules
/// - Zero or negative requests are rejected as [`CoreError::InvalidAmount`]
/// - Requests above stock are rejected as [`CoreError::OutOfStock`]
/// - `requested == stock` is accepted
pub fn check_requested_amount(
    product_id: ProductId,
    requested: i64,
    stock: StockLevel,
) -> CoreResult<i64> {
    if requested < 1 {
        return Err(CoreError::InvalidAmount {
            product_id,
            requested,
        });
    }

    if requested > stock.units() {
        return Err(CoreError::OutOfStock {
            product_id,
            available: stock.units(),
            requested,
        });
    }

    Ok(requested)
}

// =============================================================================
// Cart Invariants
// =============================================================================

/// Validates a single cart amount.
pub fn validate_amount(amount: i64) -> ValidationResult<()> {
    if amount < 1 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
            value: amount,
        });
    }
    Ok(())
}

/// Validates a sequence of products against the cart invariants.
///
/// ## Rules
/// - Every amount is at least 1
/// - No two products share an id
pub fn validate_products(products: &[Product]) -> ValidationResult<()> {
    let mut seen = HashSet::with_capacity(products.len());

    for product in products {
        validate_amount(product.amount)?;

        if !seen.insert(product.id) {
            return Err(ValidationError::Duplicate {
                field: "id".to_string(),
                value: product.id.to_string(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
