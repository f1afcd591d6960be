//! # rocket-cart: Cart Store for Rocket Cart
//!
//! Owns the shopper's cart for one session. Every mutation is checked against
//! live stock, written through to durable storage, then published to
//! subscribers. Failures never reach the caller; they become a short pt-BR
//! notice.
//!
//! ## Module Organization
//! ```text
//! rocket_cart
//! ├── store     - CartStore: init, cart/subscribe/totals, the three operations
//! ├── ports     - StockOracle, ProductCatalog, PersistentKv, Notifier
//! ├── notify    - CartNotice mapping and Notifier implementations
//! ├── api       - HttpCatalogClient (reqwest)
//! ├── kv        - MemoryKv, PersistentKv for rocket_db::KvRepository
//! ├── config    - CartConfig (TOML + environment)
//! └── error     - StoreError
//! ```
//!
//! ## Wiring
//! ```rust,ignore
//! use std::sync::Arc;
//! use rocket_cart::{CartConfig, CartStore, Collaborators, HttpCatalogClient, TracingNotifier};
//!
//! let config = CartConfig::load(None)?;
//! let db = rocket_db::Database::new(rocket_db::DbConfig::new(path)).await?;
//! let api = Arc::new(HttpCatalogClient::from_settings(&config.api)?);
//!
//! let store = CartStore::init(
//!     Collaborators::from_api(api, Arc::new(db.kv()), Arc::new(TracingNotifier)),
//!     &config.storage,
//! )
//! .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod api;
pub mod config;
pub mod error;
pub mod kv;
pub mod notify;
pub mod ports;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use api::HttpCatalogClient;
pub use config::{ApiSettings, CartConfig, CorruptStatePolicy, StorageSettings};
pub use error::{StoreError, StoreResult};
pub use kv::MemoryKv;
pub use notify::{CartNotice, ChannelNotifier, NoOpNotifier, Operation, TracingNotifier};
pub use ports::{Collaborators, Notifier, PersistentKv, ProductCatalog, StockOracle};
pub use store::CartStore;
