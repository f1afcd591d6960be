//! # Key-Value Adapters
//!
//! [`PersistentKv`] implementations: an in-process map for tests and
//! throwaway sessions, and the SQLite repository from `rocket-db`.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use rocket_db::KvRepository;

use crate::error::{StoreError, StoreResult};
use crate::ports::PersistentKv;

// =============================================================================
// In-Memory Store
// =============================================================================

/// In-process key-value store. Contents die with the process.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with one entry.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let kv = Self::default();
        if let Ok(mut entries) = kv.entries.lock() {
            entries.insert(key.into(), value.into());
        }
        kv
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Persistence("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl PersistentKv for MemoryKv {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// =============================================================================
// SQLite Store
// =============================================================================

#[async_trait]
impl PersistentKv for KvRepository {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(KvRepository::get(self, key).await?)
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        Ok(KvRepository::set(self, key, value).await?)
    }
}
