//! # Domain Types
//!
//! Core domain types used throughout Rocket Cart.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ CatalogProduct  │──►│    Product      │   │   StockLevel    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  i64, fetched   │       │
//! │  │  fields (opaque)│   │  amount (≥ 1)   │   │  per operation  │       │
//! │  └─────────────────┘   │  fields (opaque)│   │  never stored   │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Opaque Catalog Fields
//! The cart only understands `id` and `amount`. Everything else the catalog
//! returns (title, price, image, ...) is carried in `fields` and written back
//! unchanged, flattened into the same JSON object.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::money::Money;
use crate::{PRICE_FIELD, TITLE_FIELD};

// =============================================================================
// Product Id
// =============================================================================

/// Stable product identifier shared by the catalog, the stock oracle and the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        ProductId(id)
    }
}

// =============================================================================
// Stock Level
// =============================================================================

/// Units available for a product, as reported by the stock oracle.
///
/// Only valid for the operation that fetched it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockLevel(pub i64);

impl StockLevel {
    /// Returns the number of available units.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
    }
}

// =============================================================================
// Catalog Product
// =============================================================================

/// A product as returned by the catalog, before it enters the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: ProductId,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CatalogProduct {
    /// Creates a catalog entry without display fields.
    pub fn new(id: ProductId) -> Self {
        CatalogProduct {
            id,
            fields: Map::new(),
        }
    }

    /// Adds an opaque field (builder style, mostly for tests and fixtures).
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product inside the cart.
///
/// ## Invariant
/// `amount >= 1` for every product held by a [`Cart`](crate::Cart). The
/// cart constructors enforce it; this struct alone does not.
///
/// ## Key Order
/// Serializes as `id`, the catalog fields in catalog order, then `amount`:
/// the shape of `{...catalogProduct, amount}`. Blobs in that shape round-trip
/// byte for byte. An `amount` stored anywhere else moves to the end on the
/// next write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier within the cart.
    pub id: ProductId,

    /// Catalog fields, passed through unchanged.
    #[serde(flatten)]
    pub fields: Map<String, Value>,

    /// Quantity currently in the cart.
    pub amount: i64,
}

impl Product {
    /// Builds a cart entry from catalog data.
    ///
    /// Any `amount` the catalog happened to send is replaced by the cart amount.
    pub fn from_catalog(catalog: CatalogProduct, amount: i64) -> Self {
        let mut fields = catalog.fields;
        fields.shift_remove("amount");

        Product {
            id: catalog.id,
            amount,
            fields,
        }
    }

    /// Returns a copy with a different amount.
    pub fn with_amount(&self, amount: i64) -> Self {
        Product {
            amount,
            ..self.clone()
        }
    }

    /// Display name from the catalog, if present.
    pub fn title(&self) -> Option<&str> {
        self.fields.get(TITLE_FIELD).and_then(Value::as_str)
    }

    /// Unit price from the catalog `price` field, if it is a number.
    pub fn unit_price(&self) -> Option<Money> {
        self.fields
            .get(PRICE_FIELD)
            .and_then(Value::as_f64)
            .map(Money::from_major_units)
    }

    /// Unit price × amount. Zero when the catalog sent no usable price.
    pub fn line_total(&self) -> Money {
        self.unit_price()
            .map(|price| price.multiply_quantity(self.amount))
            .unwrap_or_default()
    }
}

// =============================================================================
// Operation Inputs
// =============================================================================

/// Input of `update_product_amount`.
///
/// `amount` is signed on purpose: callers may send zero or negative values,
/// which are rejected by the stock rules rather than by the type system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    pub amount: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
