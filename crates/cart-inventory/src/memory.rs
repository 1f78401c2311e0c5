use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use cart_types::{Product, ProductId, StockInfo};

use crate::error::{InventoryError, InventoryResult};
use crate::traits::{ProductCatalog, StockService};

/// In-memory product catalog and stock table.
///
/// Intended for tests and demos. While offline, every lookup fails with
/// [`InventoryError::Unreachable`]. Lookups are counted so callers can
/// assert which service a cart operation consulted.
pub struct InMemoryInventory {
    products: RwLock<HashMap<ProductId, Product>>,
    stock: RwLock<HashMap<ProductId, u32>>,
    offline: AtomicBool,
    stock_lookups: AtomicU64,
    product_lookups: AtomicU64,
}

impl InMemoryInventory {
    pub fn new() -> Self {
        Self {
            products: RwLock::new(HashMap::new()),
            stock: RwLock::new(HashMap::new()),
            offline: AtomicBool::new(false),
            stock_lookups: AtomicU64::new(0),
            product_lookups: AtomicU64::new(0),
        }
    }

    /// Register a product together with its stock count.
    pub fn with_product(self, product: Product, stock: u32) -> Self {
        self.insert_product(product, stock);
        self
    }

    /// Register (or replace) a product and its stock count.
    pub fn insert_product(&self, product: Product, stock: u32) {
        let id = product.id;
        self.products
            .write()
            .expect("lock poisoned")
            .insert(id, product);
        self.set_stock(id, stock);
    }

    /// Set the stock count for a product, registered or not.
    pub fn set_stock(&self, product_id: ProductId, amount: u32) {
        self.stock
            .write()
            .expect("lock poisoned")
            .insert(product_id, amount);
    }

    /// Make every subsequent lookup fail (or succeed again).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn stock_lookups(&self) -> u64 {
        self.stock_lookups.load(Ordering::SeqCst)
    }

    pub fn product_lookups(&self) -> u64 {
        self.product_lookups.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> InventoryResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(InventoryError::Unreachable("inventory offline".into()));
        }
        Ok(())
    }
}

impl Default for InMemoryInventory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StockService for InMemoryInventory {
    async fn stock(&self, product_id: ProductId) -> InventoryResult<StockInfo> {
        self.stock_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        let stock = self.stock.read().expect("lock poisoned");
        stock
            .get(&product_id)
            .map(|amount| StockInfo::new(product_id, *amount))
            .ok_or(InventoryError::NotFound(product_id))
    }
}

#[async_trait]
impl ProductCatalog for InMemoryInventory {
    async fn product(&self, product_id: ProductId) -> InventoryResult<Product> {
        self.product_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        let products = self.products.read().expect("lock poisoned");
        products
            .get(&product_id)
            .cloned()
            .ok_or(InventoryError::NotFound(product_id))
    }
}

impl std::fmt::Debug for InMemoryInventory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.products.read().expect("lock poisoned").len();
        f.debug_struct("InMemoryInventory")
            .field("product_count", &count)
            .field("offline", &self.offline.load(Ordering::SeqCst))
            .finish()
    }
}
