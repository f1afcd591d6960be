//! Test doubles for the cart store's collaborators.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Barrier;

use rocket_cart::{
    CartStore, Collaborators, MemoryKv, Notifier, PersistentKv, ProductCatalog, StockOracle,
    StorageSettings, StoreError, StoreResult,
};
use rocket_core::{CatalogProduct, ProductId, StockLevel};

pub const KEY: &str = "@RocketShoes:cart";

// =============================================================================
// Stock
// =============================================================================

/// Stock table; unknown ids fail like an unreachable oracle.
#[derive(Default)]
pub struct FakeStock {
    levels: Mutex<HashMap<ProductId, i64>>,
    gate: Option<Arc<Barrier>>,
}

impl FakeStock {
    pub fn new(levels: &[(u64, i64)]) -> Self {
        FakeStock {
            levels: Mutex::new(levels.iter().map(|&(id, n)| (ProductId(id), n)).collect()),
            gate: None,
        }
    }

    /// Every call waits until `parties` calls are in flight.
    pub fn gated(levels: &[(u64, i64)], parties: usize) -> Self {
        FakeStock {
            gate: Some(Arc::new(Barrier::new(parties))),
            ..Self::new(levels)
        }
    }

    pub fn set(&self, id: u64, amount: i64) {
        self.levels.lock().unwrap().insert(ProductId(id), amount);
    }
}

#[async_trait]
impl StockOracle for FakeStock {
    async fn stock(&self, product_id: ProductId) -> StoreResult<StockLevel> {
        if let Some(gate) = &self.gate {
            gate.wait().await;
        }

        self.levels
            .lock()
            .unwrap()
            .get(&product_id)
            .map(|&n| StockLevel(n))
            .ok_or_else(|| StoreError::StockQuery {
                product_id,
                reason: "unknown product".into(),
            })
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Serves `sample_product(id)` for the ids it knows.
pub struct FakeCatalog {
    known: Vec<u64>,
}

impl FakeCatalog {
    pub fn new(known: &[u64]) -> Self {
        FakeCatalog {
            known: known.to_vec(),
        }
    }
}

#[async_trait]
impl ProductCatalog for FakeCatalog {
    async fn product(&self, product_id: ProductId) -> StoreResult<CatalogProduct> {
        if self.known.contains(&product_id.0) {
            Ok(sample_product(product_id.0))
        } else {
            Err(StoreError::ProductLookup {
                product_id,
                reason: "unknown product".into(),
            })
        }
    }
}

pub fn sample_product(id: u64) -> CatalogProduct {
    CatalogProduct::new(ProductId(id))
        .with_field("title", format!("Tênis {}", id))
        .with_field("price", 139.9)
        .with_field("image", format!("https://cdn.example.com/{}.jpg", id))
}

// =============================================================================
// Key-Value
// =============================================================================

/// MemoryKv whose reads or writes can be switched off, or whose next write
/// lingers after storing.
#[derive(Default)]
pub struct FlakyKv {
    inner: MemoryKv,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    slow_next_write: AtomicBool,
}

impl FlakyKv {
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// The next `set` stores its value, then yields to the scheduler a few
    /// times before returning.
    pub fn slow_next_write(&self) {
        self.slow_next_write.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl PersistentKv for FlakyKv {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Persistence("read refused".into()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Persistence("write refused".into()));
        }
        self.inner.set(key, value).await?;
        if self.slow_next_write.swap(false, Ordering::SeqCst) {
            for _ in 0..8 {
                tokio::task::yield_now().await;
            }
        }
        Ok(())
    }
}

// =============================================================================
// Notifier
// =============================================================================

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.lock().unwrap())
    }
}

impl Notifier for RecordingNotifier {
    fn report_error(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

// =============================================================================
// Harness
// =============================================================================

pub struct Harness {
    pub store: CartStore,
    pub stock: Arc<FakeStock>,
    pub kv: Arc<FlakyKv>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    /// Builds a store over `stock`, a catalog knowing ids 1..=9, and a kv
    /// seeded with `blob` if given.
    pub async fn new(stock: FakeStock, blob: Option<&str>) -> Self {
        let kv = Arc::new(FlakyKv::default());
        if let Some(blob) = blob {
            kv.set(KEY, blob).await.unwrap();
        }
        let stock = Arc::new(stock);
        let notifier = Arc::new(RecordingNotifier::default());

        let collaborators = Collaborators {
            stock: stock.clone(),
            catalog: Arc::new(FakeCatalog::new(&[1, 2, 3, 4, 5, 6, 7, 8, 9])),
            kv: kv.clone(),
            notifier: notifier.clone(),
        };

        let store = CartStore::init(collaborators, &StorageSettings::default())
            .await
            .unwrap();

        Harness {
            store,
            stock,
            kv,
            notifier,
        }
    }

    pub async fn persisted(&self) -> Option<String> {
        self.kv.get(KEY).await.unwrap()
    }

    /// `(id, amount)` pairs of the current snapshot, in order.
    pub fn amounts(&self) -> Vec<(u64, i64)> {
        self.store
            .cart()
            .iter()
            .map(|p| (p.id.0, p.amount))
            .collect()
    }
}

/// A persisted blob holding sample products with the given amounts.
pub fn blob(items: &[(u64, i64)]) -> String {
    let products: Vec<_> = items
        .iter()
        .map(|&(id, amount)| rocket_core::Product::from_catalog(sample_product(id), amount))
        .collect();
    serde_json::to_string(&products).unwrap()
}
