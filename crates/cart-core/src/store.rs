use std::sync::{Arc, RwLock};

use cart_inventory::{ProductCatalog, StockService};
use cart_store::PersistentStore;
use cart_types::{decode_cart, encode_cart, Cart, CartLine, ProductId};
use tracing::{debug, info, warn};

use crate::config::DEFAULT_STORAGE_KEY;
use crate::error::{CartError, CartResult, Operation};
use crate::messages::Messages;
use crate::notify::NotificationSink;

/// Tunables for a [`CartStore`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartOptions {
    /// Key the cart blob is stored under.
    pub storage_key: String,
    /// Messages reported through the notification sink.
    pub messages: Messages,
}

impl Default for CartOptions {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.into(),
            messages: Messages::default(),
        }
    }
}

/// What a committed mutation did to the cart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineChange {
    /// A new line was appended with amount 1.
    Added { product_id: ProductId },
    /// An existing line's amount went up by one.
    Incremented { product_id: ProductId, amount: u32 },
    /// A line was removed.
    Removed { product_id: ProductId },
    /// A line's amount was set to `to`.
    AmountSet { product_id: ProductId, from: u32, to: u32 },
    /// All lines were removed.
    Cleared { removed: usize },
}

/// Result of a committed mutation.
///
/// Returned only after the new cart has been written to durable storage and
/// published as the current cart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartUpdate {
    /// The cart after the mutation.
    pub cart: Cart,
    pub change: LineChange,
    /// Size of the blob written to storage.
    pub persisted_bytes: usize,
}

/// Owner of the current cart.
///
/// All reads return copies; the only way to change the cart is through the
/// operations below. Each operation validates a candidate cart, writes it to
/// storage and only then publishes it. If validation or the write fails, the
/// current cart is left as it was, the user is notified and the typed error
/// is returned.
///
/// Inventory lookups are the only suspension points. The cart is copied
/// before any lookup, so readers always see a complete cart. Operations are
/// not serialized against each other: two adds for the same product issued
/// without awaiting the first both start from the same amount, and the last
/// one to commit wins. Callers that need strict ordering must await each
/// operation before issuing the next.
pub struct CartStore {
    options: CartOptions,
    storage: Arc<dyn PersistentStore>,
    stock: Arc<dyn StockService>,
    catalog: Arc<dyn ProductCatalog>,
    notifier: Arc<dyn NotificationSink>,
    cart: RwLock<Cart>,
}

impl CartStore {
    /// Open a cart store with default options.
    pub fn open(
        storage: Arc<dyn PersistentStore>,
        stock: Arc<dyn StockService>,
        catalog: Arc<dyn ProductCatalog>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self::open_with(CartOptions::default(), storage, stock, catalog, notifier)
    }

    /// Open a cart store, loading the persisted cart.
    ///
    /// A missing, unreadable or corrupt blob yields an empty cart. Stock is
    /// not revalidated on load.
    pub fn open_with(
        options: CartOptions,
        storage: Arc<dyn PersistentStore>,
        stock: Arc<dyn StockService>,
        catalog: Arc<dyn ProductCatalog>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        let cart = load_cart(storage.as_ref(), &options.storage_key);
        debug!(key = %options.storage_key, lines = cart.len(), "cart loaded");
        Self {
            options,
            storage,
            stock,
            catalog,
            notifier,
            cart: RwLock::new(cart),
        }
    }

    pub fn options(&self) -> &CartOptions {
        &self.options
    }

    /// Copy of the current cart.
    pub fn get_cart(&self) -> Cart {
        self.cart.read().expect("lock poisoned").clone()
    }

    /// Re-read the persisted cart and make it current.
    ///
    /// Follows the same rules as opening: missing or corrupt data yields an
    /// empty cart.
    pub fn reload(&self) -> Cart {
        let mut current = self.cart.write().expect("lock poisoned");
        *current = load_cart(self.storage.as_ref(), &self.options.storage_key);
        debug!(lines = current.len(), "cart reloaded");
        current.clone()
    }

    /// Add one unit of `product_id`, creating its line if needed.
    ///
    /// An existing line is checked against live stock; a new line is built
    /// from the catalog's metadata with amount 1.
    pub async fn add_product(&self, product_id: ProductId) -> CartResult<CartUpdate> {
        let result = self.try_add(product_id).await;
        self.report(result)
    }

    /// Remove the line for `product_id`. Does not consult stock.
    pub fn remove_product(&self, product_id: ProductId) -> CartResult<CartUpdate> {
        let result = self.try_remove(product_id);
        self.report(result)
    }

    /// Set the amount of an existing line, bounded by live stock.
    pub async fn update_product_amount(
        &self,
        product_id: ProductId,
        amount: u32,
    ) -> CartResult<CartUpdate> {
        let result = self.try_update_amount(product_id, amount).await;
        self.report(result)
    }

    /// Remove every line.
    pub fn clear(&self) -> CartResult<CartUpdate> {
        let removed = self.get_cart().len();
        let result = self.commit(Operation::Clear, Cart::new(), LineChange::Cleared { removed });
        self.report(result)
    }

    async fn try_add(&self, product_id: ProductId) -> CartResult<CartUpdate> {
        let current = self.get_cart();

        let (next, change) = match current.get(product_id) {
            Some(line) => {
                let stock = self
                    .stock
                    .stock(product_id)
                    .await
                    .map_err(|source| CartError::Inventory {
                        operation: Operation::Add,
                        product_id,
                        source,
                    })?;
                let requested = line.amount.saturating_add(1);
                if !stock.covers(requested) {
                    return Err(CartError::StockExceeded {
                        operation: Operation::Add,
                        product_id,
                        requested,
                        available: stock.amount,
                    });
                }
                let next = current.with_amount(product_id, requested).ok_or(
                    CartError::LineNotFound {
                        operation: Operation::Add,
                        product_id,
                    },
                )?;
                (next, LineChange::Incremented { product_id, amount: requested })
            }
            None => {
                let product = self
                    .catalog
                    .product(product_id)
                    .await
                    .map_err(|source| CartError::Inventory {
                        operation: Operation::Add,
                        product_id,
                        source,
                    })?;
                let mut line = CartLine::from_product(product);
                line.product_id = product_id;
                let next = current
                    .with_line(line)
                    .map_err(|source| CartError::Invariant {
                        operation: Operation::Add,
                        source,
                    })?;
                (next, LineChange::Added { product_id })
            }
        };

        self.commit(Operation::Add, next, change)
    }

    fn try_remove(&self, product_id: ProductId) -> CartResult<CartUpdate> {
        let current = self.get_cart();
        let next = current.without(product_id).ok_or(CartError::LineNotFound {
            operation: Operation::Remove,
            product_id,
        })?;
        self.commit(Operation::Remove, next, LineChange::Removed { product_id })
    }

    async fn try_update_amount(&self, product_id: ProductId, amount: u32) -> CartResult<CartUpdate> {
        let current = self.get_cart();

        let from = match current.get(product_id) {
            Some(line) => line.amount,
            None => {
                return Err(CartError::LineNotFound {
                    operation: Operation::UpdateAmount,
                    product_id,
                })
            }
        };
        if amount < 1 {
            return Err(CartError::InvalidAmount { product_id, amount });
        }

        let stock = self
            .stock
            .stock(product_id)
            .await
            .map_err(|source| CartError::Inventory {
                operation: Operation::UpdateAmount,
                product_id,
                source,
            })?;
        if !stock.covers(amount) {
            return Err(CartError::StockExceeded {
                operation: Operation::UpdateAmount,
                product_id,
                requested: amount,
                available: stock.amount,
            });
        }

        let next = current
            .with_amount(product_id, amount)
            .ok_or(CartError::InvalidAmount { product_id, amount })?;
        self.commit(
            Operation::UpdateAmount,
            next,
            LineChange::AmountSet { product_id, from, to: amount },
        )
    }

    /// Persist `next`, then publish it.
    ///
    /// The write lock is held across the storage write so that storage and
    /// memory always agree on which of two racing commits came last.
    fn commit(&self, operation: Operation, next: Cart, change: LineChange) -> CartResult<CartUpdate> {
        let bytes = encode_cart(&next).map_err(|source| CartError::Encode { operation, source })?;

        let mut current = self.cart.write().expect("lock poisoned");
        self.storage
            .write(&self.options.storage_key, &bytes)
            .map_err(|source| CartError::Persistence { operation, source })?;
        *current = next.clone();
        drop(current);

        info!(%operation, ?change, lines = next.len(), "cart committed");
        Ok(CartUpdate {
            cart: next,
            change,
            persisted_bytes: bytes.len(),
        })
    }

    /// Notify the user about a failed operation.
    fn report(&self, result: CartResult<CartUpdate>) -> CartResult<CartUpdate> {
        if let Err(err) = &result {
            warn!(operation = %err.operation(), kind = ?err.kind(), error = %err, "cart operation rejected");
            self.notifier.notify(self.options.messages.for_error(err));
        }
        result
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cart = self.cart.read().expect("lock poisoned");
        f.debug_struct("CartStore")
            .field("storage_key", &self.options.storage_key)
            .field("lines", &cart.len())
            .finish()
    }
}

fn load_cart(storage: &dyn PersistentStore, key: &str) -> Cart {
    match storage.read(key) {
        Ok(Some(bytes)) => decode_cart(&bytes).unwrap_or_else(|e| {
            warn!(key, error = %e, "discarding corrupt cart blob");
            Cart::new()
        }),
        Ok(None) => Cart::new(),
        Err(e) => {
            warn!(key, error = %e, "cannot read persisted cart, starting empty");
            Cart::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingSink;
    use crate::error::ErrorKind;
    use cart_inventory::{InMemoryInventory, InventoryError};
    use cart_store::{FileStore, InMemoryStore};
    use cart_types::Product;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    const KEY: &str = DEFAULT_STORAGE_KEY;

    struct Harness {
        storage: Arc<InMemoryStore>,
        inventory: Arc<InMemoryInventory>,
        sink: Arc<RecordingSink>,
        store: CartStore,
    }

    impl Harness {
        fn new(storage: InMemoryStore, inventory: InMemoryInventory) -> Self {
            let storage = Arc::new(storage);
            let inventory = Arc::new(inventory);
            let sink = Arc::new(RecordingSink::new());
            let store = CartStore::open(
                storage.clone(),
                inventory.clone(),
                inventory.clone(),
                sink.clone(),
            );
            Self { storage, inventory, sink, store }
        }

        fn empty(inventory: InMemoryInventory) -> Self {
            Self::new(InMemoryStore::new(), inventory)
        }

        fn with_cart(lines: Vec<CartLine>, inventory: InMemoryInventory) -> Self {
            let cart = Cart::from_lines(lines).unwrap();
            let storage = InMemoryStore::with_value(KEY, encode_cart(&cart).unwrap());
            Self::new(storage, inventory)
        }

        fn persisted(&self) -> Cart {
            decode_cart(&self.storage.read(KEY).unwrap().unwrap()).unwrap()
        }
    }

    fn product(id: u64, name: &str, price: i64) -> Product {
        Product::new(
            ProductId::new(id),
            name,
            Decimal::new(price, 0),
            format!("https://img.example/{id}.jpg"),
        )
    }

    fn line(id: u64, amount: u32) -> CartLine {
        CartLine {
            amount,
            ..CartLine::from_product(product(id, &format!("product-{id}"), 10))
        }
    }

    fn ids(cart: &Cart) -> Vec<u64> {
        cart.iter().map(|l| l.product_id.get()).collect()
    }

    fn pid(id: u64) -> ProductId {
        ProductId::new(id)
    }

    // -----------------------------------------------------------------------
    // Initialization
    // -----------------------------------------------------------------------

    #[test]
    fn opens_empty_without_blob() {
        let h = Harness::empty(InMemoryInventory::new());
        assert!(h.store.get_cart().is_empty());
        assert_eq!(h.storage.write_count(), 0);
    }

    #[test]
    fn opens_persisted_cart() {
        let h = Harness::with_cart(vec![line(3, 2), line(1, 1)], InMemoryInventory::new());
        assert_eq!(ids(&h.store.get_cart()), vec![3, 1]);
        assert_eq!(h.inventory.stock_lookups(), 0);
    }

    #[test]
    fn corrupt_blob_yields_empty_cart() {
        let h = Harness::new(
            InMemoryStore::with_value(KEY, b"{{garbage".to_vec()),
            InMemoryInventory::new(),
        );
        assert!(h.store.get_cart().is_empty());
    }

    #[test]
    fn custom_storage_key() {
        let storage = Arc::new(InMemoryStore::new());
        let inventory = Arc::new(InMemoryInventory::new());
        let store = CartStore::open_with(
            CartOptions { storage_key: "other".into(), messages: Messages::pt_br() },
            storage.clone(),
            inventory.clone(),
            inventory,
            Arc::new(RecordingSink::new()),
        );
        store.clear().unwrap();
        assert_eq!(storage.keys(), vec!["other".to_string()]);
        assert_eq!(store.options().messages, Messages::pt_br());
    }

    // -----------------------------------------------------------------------
    // add_product
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn add_new_product_from_catalog() {
        let h = Harness::empty(InMemoryInventory::new().with_product(product(42, "Shoe", 100), 5));
        let update = h.store.add_product(pid(42)).await.unwrap();

        let cart = h.store.get_cart();
        assert_eq!(cart.len(), 1);
        let l = &cart.lines()[0];
        assert_eq!(l.product_id, pid(42));
        assert_eq!(l.amount, 1);
        assert_eq!(l.name, "Shoe");
        assert_eq!(l.price, Decimal::new(100, 0));
        assert_eq!(update.change, LineChange::Added { product_id: pid(42) });
        assert_eq!(update.cart, cart);
        assert_eq!(h.persisted(), cart);
        assert!(update.persisted_bytes > 0);
        assert!(h.sink.is_empty());
        assert_eq!(h.inventory.stock_lookups(), 0);
    }

    #[tokio::test]
    async fn add_existing_increments_within_stock() {
        let h = Harness::with_cart(
            vec![line(1, 1), line(42, 2)],
            InMemoryInventory::new().with_product(product(42, "Shoe", 100), 3),
        );
        let update = h.store.add_product(pid(42)).await.unwrap();
        assert_eq!(update.change, LineChange::Incremented { product_id: pid(42), amount: 3 });
        assert_eq!(h.store.get_cart().get(pid(42)).unwrap().amount, 3);
        assert_eq!(ids(&h.store.get_cart()), vec![1, 42]);
        assert_eq!(h.persisted(), h.store.get_cart());
        assert_eq!(h.inventory.product_lookups(), 0);
    }

    #[tokio::test]
    async fn add_beyond_stock_is_rejected() {
        let h = Harness::with_cart(
            vec![line(42, 5)],
            InMemoryInventory::new().with_product(product(42, "Shoe", 100), 5),
        );
        let before = h.store.get_cart();
        let err = h.store.add_product(pid(42)).await.unwrap_err();

        assert!(matches!(
            err,
            CartError::StockExceeded { requested: 6, available: 5, .. }
        ));
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(h.store.get_cart(), before);
        assert_eq!(h.storage.write_count(), 0);
        assert_eq!(h.sink.messages(), vec!["requested quantity exceeds stock"]);
    }

    #[tokio::test]
    async fn add_unknown_product_fails() {
        let h = Harness::empty(InMemoryInventory::new());
        let err = h.store.add_product(pid(9)).await.unwrap_err();
        assert!(matches!(
            err,
            CartError::Inventory { source: InventoryError::NotFound(_), .. }
        ));
        assert_eq!(err.kind(), ErrorKind::Dependency);
        assert!(h.store.get_cart().is_empty());
        assert_eq!(h.sink.messages(), vec!["addition failed"]);
    }

    #[tokio::test]
    async fn add_with_stock_service_down_fails() {
        let h = Harness::with_cart(
            vec![line(42, 1)],
            InMemoryInventory::new().with_product(product(42, "Shoe", 100), 5),
        );
        h.inventory.set_offline(true);
        let err = h.store.add_product(pid(42)).await.unwrap_err();
        assert!(matches!(
            err,
            CartError::Inventory { source: InventoryError::Unreachable(_), .. }
        ));
        assert_eq!(h.store.get_cart().get(pid(42)).unwrap().amount, 1);
        assert_eq!(h.sink.last().as_deref(), Some("addition failed"));
    }

    #[tokio::test]
    async fn add_with_storage_failure_keeps_memory_and_storage_in_sync() {
        let h = Harness::with_cart(
            vec![line(1, 1)],
            InMemoryInventory::new().with_product(product(42, "Shoe", 100), 5),
        );
        h.storage.set_read_only(true);
        let err = h.store.add_product(pid(42)).await.unwrap_err();

        assert!(matches!(err, CartError::Persistence { operation: Operation::Add, .. }));
        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert_eq!(ids(&h.store.get_cart()), vec![1]);
        assert_eq!(h.persisted(), h.store.get_cart());
        assert_eq!(h.sink.messages(), vec!["addition failed"]);
    }

    #[tokio::test]
    async fn adds_of_distinct_products_keep_insertion_order() {
        let inventory = InMemoryInventory::new()
            .with_product(product(3, "c", 1), 1)
            .with_product(product(1, "a", 1), 1)
            .with_product(product(2, "b", 1), 1);
        let h = Harness::empty(inventory);
        for id in [3, 1, 2] {
            h.store.add_product(pid(id)).await.unwrap();
        }
        let cart = h.store.get_cart();
        assert_eq!(ids(&cart), vec![3, 1, 2]);
        assert!(cart.iter().all(|l| l.amount == 1));
    }

    /// Stock service that yields once before answering, so that two
    /// operations can interleave at the lookup.
    struct YieldingStock(Arc<InMemoryInventory>);

    #[async_trait::async_trait]
    impl StockService for YieldingStock {
        async fn stock(&self, product_id: ProductId) -> cart_inventory::InventoryResult<cart_types::StockInfo> {
            tokio::task::yield_now().await;
            self.0.stock(product_id).await
        }
    }

    #[tokio::test]
    async fn racing_adds_last_write_wins() {
        let cart = Cart::from_lines(vec![line(42, 1)]).unwrap();
        let storage = Arc::new(InMemoryStore::with_value(KEY, encode_cart(&cart).unwrap()));
        let inventory = Arc::new(InMemoryInventory::new().with_product(product(42, "Shoe", 100), 10));
        let store = CartStore::open(
            storage.clone(),
            Arc::new(YieldingStock(inventory.clone())),
            inventory,
            Arc::new(RecordingSink::new()),
        );

        let (a, b) = tokio::join!(store.add_product(pid(42)), store.add_product(pid(42)));
        assert_eq!(a.unwrap().cart.get(pid(42)).unwrap().amount, 2);
        assert_eq!(b.unwrap().cart.get(pid(42)).unwrap().amount, 2);
        assert_eq!(store.get_cart().get(pid(42)).unwrap().amount, 2);
        assert_eq!(storage.write_count(), 2);
        let persisted = decode_cart(&storage.read(KEY).unwrap().unwrap()).unwrap();
        assert_eq!(persisted, store.get_cart());
    }

    // -----------------------------------------------------------------------
    // remove_product
    // -----------------------------------------------------------------------

    #[test]
    fn remove_only_line() {
        let h = Harness::with_cart(vec![line(7, 2)], InMemoryInventory::new());
        let update = h.store.remove_product(pid(7)).unwrap();
        assert!(update.cart.is_empty());
        assert_eq!(update.change, LineChange::Removed { product_id: pid(7) });
        assert!(h.store.get_cart().is_empty());
        assert!(h.persisted().is_empty());
        assert_eq!(h.inventory.stock_lookups(), 0);
    }

    #[test]
    fn remove_keeps_relative_order() {
        let h = Harness::with_cart(
            vec![line(1, 1), line(2, 1), line(3, 4)],
            InMemoryInventory::new(),
        );
        h.store.remove_product(pid(2)).unwrap();
        assert_eq!(ids(&h.store.get_cart()), vec![1, 3]);
        assert_eq!(h.store.get_cart().get(pid(3)).unwrap().amount, 4);
    }

    #[test]
    fn remove_absent_product_fails() {
        let h = Harness::with_cart(vec![line(1, 1)], InMemoryInventory::new());
        let err = h.store.remove_product(pid(8)).unwrap_err();
        assert!(matches!(err, CartError::LineNotFound { operation: Operation::Remove, .. }));
        assert_eq!(ids(&h.store.get_cart()), vec![1]);
        assert_eq!(h.storage.write_count(), 0);
        assert_eq!(h.sink.messages(), vec!["removal failed"]);
    }

    #[test]
    fn remove_with_storage_failure() {
        let h = Harness::with_cart(vec![line(1, 1)], InMemoryInventory::new());
        h.storage.set_read_only(true);
        let err = h.store.remove_product(pid(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert_eq!(ids(&h.store.get_cart()), vec![1]);
        assert_eq!(h.sink.messages(), vec!["removal failed"]);
    }

    // -----------------------------------------------------------------------
    // update_product_amount
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn update_within_stock() {
        let h = Harness::with_cart(
            vec![line(7, 2), line(8, 1)],
            InMemoryInventory::new().with_product(product(7, "Boot", 50), 4),
        );
        let update = h.store.update_product_amount(pid(7), 4).await.unwrap();
        assert_eq!(update.change, LineChange::AmountSet { product_id: pid(7), from: 2, to: 4 });
        assert_eq!(h.store.get_cart().get(pid(7)).unwrap().amount, 4);
        assert_eq!(ids(&h.store.get_cart()), vec![7, 8]);
        assert_eq!(h.persisted(), h.store.get_cart());
    }

    #[tokio::test]
    async fn update_can_decrease() {
        let h = Harness::with_cart(
            vec![line(7, 3)],
            InMemoryInventory::new().with_product(product(7, "Boot", 50), 4),
        );
        h.store.update_product_amount(pid(7), 1).await.unwrap();
        assert_eq!(h.store.get_cart().get(pid(7)).unwrap().amount, 1);
    }

    #[tokio::test]
    async fn update_to_zero_is_rejected() {
        let h = Harness::with_cart(
            vec![line(7, 2)],
            InMemoryInventory::new().with_product(product(7, "Boot", 50), 4),
        );
        let err = h.store.update_product_amount(pid(7), 0).await.unwrap_err();
        assert!(matches!(err, CartError::InvalidAmount { amount: 0, .. }));
        assert_eq!(h.store.get_cart().get(pid(7)).unwrap().amount, 2);
        assert_eq!(h.sink.messages(), vec!["quantity change failed"]);
        assert_eq!(h.inventory.stock_lookups(), 0);
    }

    #[tokio::test]
    async fn update_absent_product_is_rejected() {
        let h = Harness::with_cart(
            vec![line(7, 2)],
            InMemoryInventory::new().with_product(product(9, "Sock", 5), 4),
        );
        let err = h.store.update_product_amount(pid(9), 1).await.unwrap_err();
        assert!(matches!(
            err,
            CartError::LineNotFound { operation: Operation::UpdateAmount, .. }
        ));
        assert_eq!(h.sink.messages(), vec!["quantity change failed"]);
        assert_eq!(h.storage.write_count(), 0);
    }

    #[tokio::test]
    async fn update_beyond_stock_is_rejected() {
        let h = Harness::with_cart(
            vec![line(7, 2)],
            InMemoryInventory::new().with_product(product(7, "Boot", 50), 3),
        );
        let err = h.store.update_product_amount(pid(7), 4).await.unwrap_err();
        assert!(err.is_stock_exceeded());
        assert_eq!(h.store.get_cart().get(pid(7)).unwrap().amount, 2);
        assert_eq!(h.sink.messages(), vec!["requested quantity exceeds stock"]);
    }

    #[tokio::test]
    async fn update_with_stock_service_down_uses_quantity_message() {
        let h = Harness::with_cart(
            vec![line(7, 2)],
            InMemoryInventory::new().with_product(product(7, "Boot", 50), 3),
        );
        h.inventory.set_offline(true);
        let err = h.store.update_product_amount(pid(7), 3).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Dependency);
        assert_eq!(h.sink.messages(), vec!["quantity change failed"]);
    }

    #[tokio::test]
    async fn update_with_storage_failure() {
        let h = Harness::with_cart(
            vec![line(7, 2)],
            InMemoryInventory::new().with_product(product(7, "Boot", 50), 4),
        );
        h.storage.set_read_only(true);
        let err = h.store.update_product_amount(pid(7), 4).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert_eq!(h.store.get_cart().get(pid(7)).unwrap().amount, 2);
        assert_eq!(h.persisted(), h.store.get_cart());
        assert_eq!(h.sink.messages(), vec!["quantity change failed"]);
    }

    // -----------------------------------------------------------------------
    // clear / reload / messages
    // -----------------------------------------------------------------------

    #[test]
    fn clear_empties_and_persists() {
        let h = Harness::with_cart(vec![line(1, 1), line(2, 2)], InMemoryInventory::new());
        let update = h.store.clear().unwrap();
        assert_eq!(update.change, LineChange::Cleared { removed: 2 });
        assert!(h.store.get_cart().is_empty());
        assert!(h.persisted().is_empty());
    }

    #[test]
    fn clear_with_storage_failure() {
        let h = Harness::with_cart(vec![line(1, 1), line(2, 2)], InMemoryInventory::new());
        h.storage.set_read_only(true);
        let err = h.store.clear().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert_eq!(err.operation(), Operation::Clear);
        assert_eq!(ids(&h.store.get_cart()), vec![1, 2]);
        assert_eq!(h.persisted(), h.store.get_cart());
        assert_eq!(h.sink.messages(), vec!["removal failed"]);
    }

    #[test]
    fn reload_picks_up_external_writes() {
        let h = Harness::empty(InMemoryInventory::new());
        let cart = Cart::from_lines(vec![line(5, 3)]).unwrap();
        h.storage.write(KEY, &encode_cart(&cart).unwrap()).unwrap();
        assert!(h.store.get_cart().is_empty());
        assert_eq!(h.store.reload(), cart);
        assert_eq!(h.store.get_cart(), cart);
    }

    #[tokio::test]
    async fn localized_messages() {
        let storage = Arc::new(InMemoryStore::new());
        let inventory = Arc::new(InMemoryInventory::new());
        let sink = Arc::new(RecordingSink::new());
        let store = CartStore::open_with(
            CartOptions { messages: Messages::pt_br(), ..Default::default() },
            storage,
            inventory.clone(),
            inventory,
            sink.clone(),
        );
        store.add_product(pid(1)).await.unwrap_err();
        store.remove_product(pid(1)).unwrap_err();
        assert_eq!(
            sink.messages(),
            vec!["Erro na adição do produto", "Erro na remoção do produto"]
        );
    }

    #[tokio::test]
    async fn survives_restart_with_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let inventory = Arc::new(
            InMemoryInventory::new()
                .with_product(product(42, "Shoe", 100), 5)
                .with_product(product(7, "Boot", 80), 2),
        );
        let open = || {
            CartStore::open(
                Arc::new(FileStore::open(dir.path()).unwrap()),
                inventory.clone(),
                inventory.clone(),
                Arc::new(RecordingSink::new()),
            )
        };

        let store = open();
        store.add_product(pid(42)).await.unwrap();
        store.add_product(pid(7)).await.unwrap();
        store.add_product(pid(42)).await.unwrap();
        let before = store.get_cart();
        drop(store);

        let reopened = open();
        assert_eq!(reopened.get_cart(), before);
        assert_eq!(ids(&before), vec![42, 7]);
        assert_eq!(before.total(), Decimal::new(280, 0));
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    proptest! {
        #[test]
        fn distinct_adds_yield_one_line_each(
            product_ids in prop::collection::hash_set(1u64..500, 1..20)
                .prop_map(|s| s.into_iter().collect::<Vec<_>>())
        ) {
            let inventory = InMemoryInventory::new();
            for id in &product_ids {
                inventory.insert_product(product(*id, &format!("p{id}"), *id as i64), 3);
            }
            let h = Harness::empty(inventory);
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                for id in &product_ids {
                    h.store.add_product(pid(*id)).await.unwrap();
                }
            });

            let cart = h.store.get_cart();
            prop_assert_eq!(ids(&cart), product_ids.clone());
            for l in cart.iter() {
                prop_assert_eq!(l.amount, 1);
                prop_assert_eq!(&l.name, &format!("p{}", l.product_id));
            }
            prop_assert_eq!(h.persisted(), cart);
        }

        #[test]
        fn increment_respects_stock(current in 1u32..10, stock in 0u32..12) {
            let h = Harness::with_cart(
                vec![line(1, current)],
                InMemoryInventory::new().with_product(product(1, "p", 1), stock),
            );
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let result = rt.block_on(h.store.add_product(pid(1)));
            let amount = h.store.get_cart().get(pid(1)).unwrap().amount;
            if current + 1 <= stock {
                prop_assert!(result.is_ok());
                prop_assert_eq!(amount, current + 1);
                prop_assert!(h.sink.is_empty());
            } else {
                prop_assert!(result.unwrap_err().is_stock_exceeded());
                prop_assert_eq!(amount, current);
                prop_assert_eq!(h.sink.messages(), vec!["requested quantity exceeds stock".to_string()]);
            }
        }
    }
}
