//! # Collaborator Ports
//!
//! The four seams the cart store talks through. Each is object safe and held
//! as `Arc<dyn _>`, so the store never knows whether it is talking to HTTP,
//! SQLite, a channel, or a test fake.
//!
//! ```text
//!                       ┌───────────────┐
//!   StockOracle ───────►│               │
//!   ProductCatalog ────►│   CartStore   │────► Notifier
//!   PersistentKv ◄─────►│               │
//!                       └───────────────┘
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use rocket_core::{CatalogProduct, ProductId, StockLevel};

use crate::error::StoreResult;

// =============================================================================
// Traits
// =============================================================================

/// Answers "how many units of this product are available right now".
#[async_trait]
pub trait StockOracle: Send + Sync {
    /// Returns the available stock. Fails if the oracle is unreachable or
    /// does not know the product.
    async fn stock(&self, product_id: ProductId) -> StoreResult<StockLevel>;
}

/// Looks up display data for a product.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Returns the catalog record. Fails if the product does not exist.
    async fn product(&self, product_id: ProductId) -> StoreResult<CatalogProduct>;
}

/// Durable string storage under fixed keys.
#[async_trait]
pub trait PersistentKv: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}

/// Fire-and-forget sink for user-facing messages.
pub trait Notifier: Send + Sync {
    fn report_error(&self, message: &str);
}

// =============================================================================
// Collaborator Bundle
// =============================================================================

/// Everything a [`CartStore`](crate::store::CartStore) needs from the outside.
#[derive(Clone)]
pub struct Collaborators {
    pub stock: Arc<dyn StockOracle>,
    pub catalog: Arc<dyn ProductCatalog>,
    pub kv: Arc<dyn PersistentKv>,
    pub notifier: Arc<dyn Notifier>,
}

impl Collaborators {
    /// Bundles a client that serves both stock and catalog lookups.
    pub fn from_api<A>(api: Arc<A>, kv: Arc<dyn PersistentKv>, notifier: Arc<dyn Notifier>) -> Self
    where
        A: StockOracle + ProductCatalog + 'static,
    {
        Collaborators {
            stock: api.clone(),
            catalog: api,
            kv,
            notifier,
        }
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
