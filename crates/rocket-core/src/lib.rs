//! # rocket-core: Pure Cart Logic for Rocket Cart
//!
//! This crate is the **heart** of Rocket Cart. It contains the cart model,
//! its invariants and the stock rules as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Rocket Cart Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  UI surfaces (listing, cart view)               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ add / remove / update                  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             rocket-cart (CartStore + collaborators)             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ rocket-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   cart    │  │   money   │  │ validation│  │   │
//! │  │   │  Product  │  │   Cart    │  │   Money   │  │  stock    │  │   │
//! │  │   │  StockLvl │  │  Totals   │  │  (cents)  │  │  rules    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (ProductId, Product, StockLevel, ...)
//! - [`cart`] - The ordered, id-unique Cart and its totals
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Stock ceiling and amount rules
//!
//! ## Example Usage
//!
//! ```rust
//! use rocket_core::{Cart, CatalogProduct, Product, ProductId};
//!
//! let catalog = CatalogProduct::new(ProductId(1))
//!     .with_field("title", "Tênis de Caminhada")
//!     .with_field("price", 179.9);
//!
//! let cart = Cart::new()
//!     .with_product(Product::from_catalog(catalog, 1))
//!     .unwrap();
//!
//! let blob = cart.to_json().unwrap();
//! assert_eq!(Cart::from_json(&blob).unwrap(), cart);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default key the cart blob is stored under in the key-value store.
///
/// Kept identical to the key used by earlier sessions so that existing
/// persisted carts keep loading.
pub const DEFAULT_CART_KEY: &str = "@RocketShoes:cart";

/// Catalog field holding the unit price (major currency units).
pub const PRICE_FIELD: &str = "price";

/// Catalog field holding the display name.
pub const TITLE_FIELD: &str = "title";
