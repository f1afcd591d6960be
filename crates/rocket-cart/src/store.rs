//! # Cart Store
//!
//! The single authoritative cart for a shopping session.
//!
//! ## Mutation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      One Cart Operation                                 │
//! │                                                                         │
//! │  snapshot at invocation                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌─────────┐ │
//! │  │ ask oracle / │──►│ build next   │──►│ persist blob │──►│ publish │ │
//! │  │ catalog      │   │ Cart (pure)  │   │ (kv.set)     │   │ (watch) │ │
//! │  └──────┬───────┘   └──────┬───────┘   └──────┬───────┘   └─────────┘ │
//! │         │                  │                  │                         │
//! │         └──────────────────┴──────────────────┘                         │
//! │                            │ any failure                                │
//! │                            ▼                                            │
//! │              CartNotice::for_failure → Notifier (or silence)           │
//! │              snapshot untouched                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! Operations are not queued against each other. Each one builds on the
//! snapshot current when it was invoked and the last publish wins, so two
//! overlapping `add_product` calls for the same id can both commit amount 1.
//! The snapshot is only read or replaced between awaits.
//!
//! Persist and publish run under one lock, so the stored blob and the
//! published snapshot always name the same cart once an operation returns.

use std::fmt;
use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

use rocket_core::validation::{check_increment, check_requested_amount};
use rocket_core::{Cart, CartTotals, Product, ProductId, UpdateProductAmount};

use crate::config::{CorruptStatePolicy, StorageSettings};
use crate::error::{StoreError, StoreResult};
use crate::notify::{CartNotice, Operation};
use crate::ports::Collaborators;

/// Owns the session cart and mediates every mutation.
///
/// ## Example
/// ```rust,ignore
/// let store = CartStore::init(collaborators, &config.storage).await?;
///
/// store.add_product(ProductId(1)).await;
/// let mut updates = store.subscribe();
/// updates.changed().await?;
/// println!("{} items", store.totals().item_count);
/// ```
pub struct CartStore {
    collaborators: Collaborators,
    key: String,
    snapshot: watch::Sender<Arc<Cart>>,
    commit_lock: Mutex<()>,
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.key)
            .field("items", &self.snapshot.borrow().item_count())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    // =========================================================================
    // Initialization
    // =========================================================================

    /// Loads the persisted cart and returns a ready store.
    ///
    /// ## Startup Rules
    /// - No value, or an empty string: start with an empty cart
    /// - Unreadable value: follow `storage.on_corrupt_state`
    /// - The key-value store itself failing: error
    pub async fn init(collaborators: Collaborators, storage: &StorageSettings) -> StoreResult<Self> {
        let key = storage.key.clone();
        let blob = collaborators.kv.get(&key).await?;

        let cart = match blob.as_deref() {
            None | Some("") => {
                debug!(key = %key, "No persisted cart, starting empty");
                Cart::new()
            }
            Some(blob) => match Cart::from_json(blob) {
                Ok(cart) => cart,
                Err(e) => match storage.on_corrupt_state {
                    CorruptStatePolicy::Reset => {
                        warn!(key = %key, error = %e, "Discarding unreadable persisted cart");
                        Cart::new()
                    }
                    CorruptStatePolicy::Fail => return Err(StoreError::CorruptState(e.to_string())),
                },
            },
        };

        info!(key = %key, items = cart.item_count(), "Cart store ready");

        let (snapshot, _) = watch::channel(Arc::new(cart));
        Ok(CartStore {
            collaborators,
            key,
            snapshot,
            commit_lock: Mutex::new(()),
        })
    }

    // =========================================================================
    // Read Surface
    // =========================================================================

    /// Returns the current snapshot.
    pub fn cart(&self) -> Arc<Cart> {
        self.snapshot.borrow().clone()
    }

    /// Returns a receiver that observes every committed snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Cart>> {
        self.snapshot.subscribe()
    }

    /// Returns item count, quantity and subtotal of the current snapshot.
    pub fn totals(&self) -> CartTotals {
        CartTotals::from(self.cart().as_ref())
    }

    /// Returns the key the cart is persisted under.
    pub fn storage_key(&self) -> &str {
        &self.key
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Adds one unit of a product, inserting it if absent.
    ///
    /// ## Behavior
    /// - Already in cart with amount `a`: requires stock `> a`
    /// - Not in cart: fetched from the catalog and appended with amount 1
    ///
    /// Failures end in a notice; the cart is left unchanged.
    pub async fn add_product(&self, product_id: ProductId) {
        debug!(product_id = %product_id, "add_product");
        let result = self.try_add_product(product_id).await;
        self.finish(Operation::AddProduct, product_id, result);
    }

    /// Removes a product entirely, whatever its amount.
    pub async fn remove_product(&self, product_id: ProductId) {
        debug!(product_id = %product_id, "remove_product");
        let result = self.try_remove_product(product_id).await;
        self.finish(Operation::RemoveProduct, product_id, result);
    }

    /// Sets the amount of a product already in the cart.
    ///
    /// ## Behavior
    /// - Not in cart: silently ignored
    /// - Amount below 1 or above stock: out-of-stock notice
    pub async fn update_product_amount(&self, request: UpdateProductAmount) {
        debug!(
            product_id = %request.product_id,
            amount = request.amount,
            "update_product_amount"
        );
        let result = self.try_update_product_amount(request).await;
        self.finish(Operation::UpdateProductAmount, request.product_id, result);
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    async fn try_add_product(&self, product_id: ProductId) -> StoreResult<Arc<Cart>> {
        let current = self.cart();
        let stock = self.collaborators.stock.stock(product_id).await?;

        let next = match current.get(product_id) {
            Some(existing) => {
                let amount = check_increment(product_id, existing.amount, stock)?;
                current.with_amount(product_id, amount)?
            }
            None => {
                let mut catalog = self.collaborators.catalog.product(product_id).await?;
                if catalog.id != product_id {
                    warn!(
                        product_id = %product_id,
                        catalog_id = %catalog.id,
                        "Catalog returned a different id, keeping the requested one"
                    );
                    catalog.id = product_id;
                }
                current.with_product(Product::from_catalog(catalog, 1))?
            }
        };

        self.commit(next).await
    }

    async fn try_remove_product(&self, product_id: ProductId) -> StoreResult<Arc<Cart>> {
        let next = self.cart().without(product_id)?;
        self.commit(next).await
    }

    async fn try_update_product_amount(&self, request: UpdateProductAmount) -> StoreResult<Arc<Cart>> {
        let UpdateProductAmount { product_id, amount } = request;

        let current = self.cart();
        let stock = self.collaborators.stock.stock(product_id).await?;

        if !current.contains(product_id) {
            return Err(rocket_core::CoreError::ProductNotInCart(product_id).into());
        }

        let amount = check_requested_amount(product_id, amount, stock)?;
        let next = current.with_amount(product_id, amount)?;

        self.commit(next).await
    }

    /// Persists `next`, then publishes it.
    ///
    /// Held across both steps: without it a slow `kv.set` could finish after
    /// a later one and leave storage behind the published snapshot.
    async fn commit(&self, next: Cart) -> StoreResult<Arc<Cart>> {
        let blob = next.to_json()?;
        let _guard = self.commit_lock.lock().await;
        self.collaborators.kv.set(&self.key, &blob).await?;

        let next = Arc::new(next);
        self.snapshot.send_replace(next.clone());
        Ok(next)
    }

    // =========================================================================
    // Failure Boundary
    // =========================================================================

    fn finish(&self, operation: Operation, product_id: ProductId, result: StoreResult<Arc<Cart>>) {
        let err = match result {
            Ok(cart) => {
                info!(
                    %operation,
                    product_id = %product_id,
                    items = cart.item_count(),
                    quantity = cart.total_quantity(),
                    "Cart committed"
                );
                return;
            }
            Err(err) => err,
        };

        match &err {
            StoreError::Persistence(_) | StoreError::Serialization(_) => {
                error!(%operation, product_id = %product_id, error = %err, "Cart not persisted");
            }
            err if err.is_collaborator_failure() => {
                warn!(%operation, product_id = %product_id, error = %err, "Collaborator call failed");
            }
            _ => {
                info!(%operation, product_id = %product_id, error = %err, "Cart operation rejected");
            }
        }

        if let Some(notice) = CartNotice::for_failure(operation, &err) {
            self.collaborators.notifier.report_error(notice.message());
        }
    }
}
