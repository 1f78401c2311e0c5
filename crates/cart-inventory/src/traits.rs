use std::sync::Arc;

use async_trait::async_trait;
use cart_types::{Product, ProductId, StockInfo};

use crate::error::InventoryResult;

/// Source of current stock counts.
#[async_trait]
pub trait StockService: Send + Sync {
    /// Fetch the stock currently available for `product_id`.
    async fn stock(&self, product_id: ProductId) -> InventoryResult<StockInfo>;
}

/// Source of product metadata.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Fetch name, price and image for `product_id`.
    async fn product(&self, product_id: ProductId) -> InventoryResult<Product>;
}

#[async_trait]
impl<T: StockService + ?Sized> StockService for Arc<T> {
    async fn stock(&self, product_id: ProductId) -> InventoryResult<StockInfo> {
        (**self).stock(product_id).await
    }
}

#[async_trait]
impl<T: ProductCatalog + ?Sized> ProductCatalog for Arc<T> {
    async fn product(&self, product_id: ProductId) -> InventoryResult<Product> {
        (**self).product(product_id).await
    }
}
