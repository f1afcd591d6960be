//! # HTTP Catalog Client
//!
//! Serves both [`StockOracle`] and [`ProductCatalog`] from the shop's REST
//! API.
//!
//! ## Endpoints
//! ```text
//! GET {base_url}/stock/{id}     → {"id": 1, "amount": 3}
//! GET {base_url}/products/{id}  → {"id": 1, "title": "...", "price": 139.9, "image": "..."}
//!
//! 2xx          → decoded body
//! 404          → "unknown product"
//! other status → "HTTP {status}"
//! transport    → reqwest error text
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use rocket_core::{CatalogProduct, ProductId, StockLevel};

use crate::config::ApiSettings;
use crate::error::{StoreError, StoreResult};
use crate::ports::{ProductCatalog, StockOracle};

/// Body of `GET /stock/{id}`.
#[derive(Debug, Deserialize)]
struct StockResponse {
    #[allow(dead_code)]
    id: ProductId,
    amount: i64,
}

/// REST client for the catalog and stock endpoints.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    client: Client,
    base_url: Url,
}

impl HttpCatalogClient {
    /// Creates a client for `base_url`, with an optional per-request timeout.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> StoreResult<Self> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| StoreError::InvalidConfig(format!("HTTP client: {}", e)))?;

        Ok(HttpCatalogClient { client, base_url })
    }

    /// Creates a client from the `[api]` config section.
    pub fn from_settings(settings: &ApiSettings) -> StoreResult<Self> {
        Self::new(&settings.base_url, settings.request_timeout())
    }

    /// Returns the base URL every endpoint is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, String> {
        let url = self.base_url.join(path).map_err(|e| e.to_string())?;
        debug!(%url, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if status.is_success() {
            response.json::<T>().await.map_err(|e| e.to_string())
        } else if status == StatusCode::NOT_FOUND {
            Err("unknown product".to_string())
        } else {
            Err(format!("HTTP {}", status))
        }
    }
}

#[async_trait]
impl StockOracle for HttpCatalogClient {
    async fn stock(&self, product_id: ProductId) -> StoreResult<StockLevel> {
        let body: StockResponse = self
            .fetch(&format!("stock/{}", product_id))
            .await
            .map_err(|reason| StoreError::StockQuery { product_id, reason })?;

        Ok(StockLevel(body.amount))
    }
}

#[async_trait]
impl ProductCatalog for HttpCatalogClient {
    async fn product(&self, product_id: ProductId) -> StoreResult<CatalogProduct> {
        self.fetch(&format!("products/{}", product_id))
            .await
            .map_err(|reason| StoreError::ProductLookup { product_id, reason })
    }
}
