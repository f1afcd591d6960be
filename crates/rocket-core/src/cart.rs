//! # Cart
//!
//! The ordered, id-unique collection of products a shopper has selected.
//!
//! ## Snapshot Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Values Are Never Edited In Place                │
//! │                                                                         │
//! │  Operation                 Pure method              Result              │
//! │  ─────────                 ───────────              ──────              │
//! │                                                                         │
//! │  first add ──────────────► with_product(p) ───────► new Cart (appended)│
//! │                                                                         │
//! │  add again / set amount ─► with_amount(id, n) ────► new Cart (same     │
//! │                                                      position)          │
//! │                                                                         │
//! │  remove ─────────────────► without(id) ───────────► new Cart (order of │
//! │                                                      the rest kept)     │
//! │                                                                         │
//! │  The old value stays valid: consumers holding it keep a consistent     │
//! │  snapshot while the store publishes the new one.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Every product has `amount >= 1`
//! - Products are unique by `id`
//! - Order is first-insertion order
//!
//! Every constructor and deserializer enforces both, so any `Cart` value in
//! the program satisfies them.

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Product, ProductId};
use crate::validation::{validate_amount, validate_products};

/// The shopping cart.
///
/// Serializes as a bare JSON array of products; that array is the persisted
/// blob format.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(try_from = "Vec<Product>")]
pub struct Cart {
    products: Vec<Product>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            products: Vec::new(),
        }
    }

    /// Builds a cart from products, checking the invariants.
    pub fn from_products(products: Vec<Product>) -> CoreResult<Self> {
        validate_products(&products)?;
        Ok(Cart { products })
    }

    /// Decodes a persisted blob.
    ///
    /// ## Errors
    /// - `InvalidFormat` if the text is not a JSON array of products
    /// - `MustBePositive` / `Duplicate` if the array breaks an invariant
    pub fn from_json(blob: &str) -> CoreResult<Self> {
        let products: Vec<Product> =
            serde_json::from_str(blob).map_err(|e| ValidationError::InvalidFormat {
                field: "cart".to_string(),
                reason: e.to_string(),
            })?;
        Cart::from_products(products)
    }

    /// Encodes the cart as its persisted blob.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.products)
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Returns a new cart with `product` appended at the end.
    ///
    /// ## Errors
    /// - `DuplicateProduct` if the id is already present
    /// - `Validation` if the product amount is below 1
    pub fn with_product(&self, product: Product) -> CoreResult<Self> {
        if self.contains(product.id) {
            return Err(CoreError::DuplicateProduct(product.id));
        }
        validate_amount(product.amount)?;

        let mut products = Vec::with_capacity(self.products.len() + 1);
        products.extend(self.products.iter().cloned());
        products.push(product);
        Ok(Cart { products })
    }

    /// Returns a new cart where `product_id` has exactly `amount` units.
    ///
    /// The product keeps its position.
    pub fn with_amount(&self, product_id: ProductId, amount: i64) -> CoreResult<Self> {
        validate_amount(amount)?;

        let index = self
            .position(product_id)
            .ok_or(CoreError::ProductNotInCart(product_id))?;

        let mut products = self.products.clone();
        products[index] = products[index].with_amount(amount);
        Ok(Cart { products })
    }

    /// Returns a new cart without `product_id`, keeping the order of the rest.
    pub fn without(&self, product_id: ProductId) -> CoreResult<Self> {
        if !self.contains(product_id) {
            return Err(CoreError::ProductNotInCart(product_id));
        }

        let products = self
            .products
            .iter()
            .filter(|p| p.id != product_id)
            .cloned()
            .collect();
        Ok(Cart { products })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Products in insertion order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Product> {
        self.products.iter()
    }

    /// Looks up a product by id.
    pub fn get(&self, product_id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }

    pub fn contains(&self, product_id: ProductId) -> bool {
        self.get(product_id).is_some()
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.products.iter().position(|p| p.id == product_id)
    }

    /// Returns the number of distinct products in the cart.
    pub fn item_count(&self) -> usize {
        self.products.len()
    }

    /// Returns the total quantity of all products, saturating at `i64::MAX`.
    pub fn total_quantity(&self) -> i64 {
        self.products
            .iter()
            .fold(0i64, |total, p| total.saturating_add(p.amount))
    }

    /// Sum of price × amount over products that carry a numeric price.
    pub fn subtotal(&self) -> Money {
        self.products.iter().map(Product::line_total).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl TryFrom<Vec<Product>> for Cart {
    type Error = ValidationError;

    fn try_from(products: Vec<Product>) -> Result<Self, Self::Error> {
        validate_products(&products)?;
        Ok(Cart { products })
    }
}

impl Serialize for Cart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.products.serialize(serializer)
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.products.iter()
    }
}

/// Cart totals summary for UI surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            subtotal: cart.subtotal(),
        }
    }
}
