use std::time::Duration;

use async_trait::async_trait;
use cart_types::{Product, ProductId, StockInfo};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{InventoryError, InventoryResult};
use crate::traits::{ProductCatalog, StockService};

/// JSON API client for the inventory service.
///
/// Endpoints, relative to the base URL:
///
/// - `GET /stock/{id}` -> `{ "id": 1, "amount": 3 }`
/// - `GET /products/{id}` -> `{ "id": 1, "title": "...", "price": 179.9, "image": "..." }`
///
/// A `404` maps to [`InventoryError::NotFound`]; connection failures and any
/// other non-success status map to [`InventoryError::Unreachable`].
#[derive(Clone, Debug)]
pub struct HttpInventory {
    client: Client,
    base_url: String,
}

impl HttpInventory {
    /// Client for the service at `base_url` with reqwest defaults.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Client with a per-request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> InventoryResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InventoryError::Unreachable(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Client reusing an existing reqwest client.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn stock_url(&self, product_id: ProductId) -> String {
        format!("{}/stock/{product_id}", self.base_url)
    }

    fn product_url(&self, product_id: ProductId) -> String {
        format!("{}/products/{product_id}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, product_id: ProductId) -> InventoryResult<T> {
        debug!(%url, "inventory request");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| InventoryError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(InventoryError::NotFound(product_id));
        }
        if !status.is_success() {
            return Err(InventoryError::Unreachable(format!("{url} returned {status}")));
        }

        response.json::<T>().await.map_err(|e| {
            if e.is_decode() {
                InventoryError::Decode(e.to_string())
            } else {
                InventoryError::Unreachable(e.to_string())
            }
        })
    }
}

#[async_trait]
impl StockService for HttpInventory {
    async fn stock(&self, product_id: ProductId) -> InventoryResult<StockInfo> {
        let url = self.stock_url(product_id);
        let stock: StockInfo = self.get_json(&url, product_id).await?;
        if stock.id != product_id {
            return Err(InventoryError::Decode(format!(
                "stock record for {} returned for {product_id}",
                stock.id
            )));
        }
        Ok(stock)
    }
}

#[async_trait]
impl ProductCatalog for HttpInventory {
    async fn product(&self, product_id: ProductId) -> InventoryResult<Product> {
        let url = self.product_url(product_id);
        let product: Product = self.get_json(&url, product_id).await?;
        if product.id != product_id {
            return Err(InventoryError::Decode(format!(
                "product {} returned for {product_id}",
                product.id
            )));
        }
        Ok(product)
    }
}
