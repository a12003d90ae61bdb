//! The cart store: session-scoped line items with write-behind persistence.
//!
//! In-memory state is authoritative for the lifetime of the session. Every
//! mutation reschedules a debounced flush; rapid mutations within the window
//! coalesce into one write carrying the latest state. Storage failures are
//! logged and swallowed - the cart keeps working from memory.

pub mod registry;
pub mod storage;

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use orchard_core::ProductId;

pub use registry::{CartRegistry, SessionCart};
pub use storage::{CartStorage, MemoryCartStorage, PgCartStorage, StorageError};

use super::analytics::{CartAnalytics, CartEvent};
use crate::models::product::Product;

/// One line in a cart: a product reference with a quantity.
///
/// There is at most one `CartItem` per product id in a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
    pub quantity: u32,
}

impl CartItem {
    fn from_product(product: &Product) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            image_url: product.image_url.clone(),
            quantity: 1,
        }
    }

    /// Price of this line: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Session-scoped cart with derived totals and debounced persistence.
pub struct CartStore<S> {
    items: Vec<CartItem>,
    storage: S,
    analytics: Arc<dyn CartAnalytics>,
    flush_delay: Duration,
    pending_flush: Option<JoinHandle<()>>,
}

impl<S> CartStore<S>
where
    S: CartStorage + Clone + Send + Sync + 'static,
{
    /// Build a cart from its persisted snapshot.
    ///
    /// A missing, unreadable or corrupt snapshot yields an empty cart; that
    /// is a normal start, not an error.
    pub async fn load(
        storage: S,
        analytics: Arc<dyn CartAnalytics>,
        flush_delay: Duration,
    ) -> Self {
        let items = match storage.load().await {
            Ok(Some(items)) => items,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::debug!("discarding unreadable cart snapshot: {e}");
                Vec::new()
            }
        };

        Self {
            items,
            storage,
            analytics,
            flush_delay,
            pending_flush: None,
        }
    }

    /// Current line items, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Whether the cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total quantity across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Total price across all lines.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Add one unit of a product.
    ///
    /// Increments the existing line's quantity, or appends a new line with
    /// quantity 1. Emits an add signal either way.
    pub fn add_item(&mut self, product: &Product) {
        match self
            .items
            .iter_mut()
            .find(|item| item.product_id == product.id)
        {
            Some(item) => item.quantity = item.quantity.saturating_add(1),
            None => self.items.push(CartItem::from_product(product)),
        }

        self.analytics.cart_event(&CartEvent::ItemAdded {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
        });

        self.schedule_flush();
    }

    /// Overwrite a line's quantity.
    ///
    /// No-op when `quantity < 1` (removal must be explicit) or when the
    /// product isn't in the cart.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) {
        if quantity < 1 {
            return;
        }

        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.product_id == product_id)
        {
            item.quantity = quantity;
            self.schedule_flush();
        }
    }

    /// Remove a line entirely. No-op when the product isn't in the cart.
    ///
    /// Emits a remove signal carrying the pre-removal line snapshot.
    pub fn remove_item(&mut self, product_id: ProductId) {
        let Some(position) = self
            .items
            .iter()
            .position(|item| item.product_id == product_id)
        else {
            return;
        };

        let removed = self.items.remove(position);
        self.analytics
            .cart_event(&CartEvent::ItemRemoved { item: removed });

        self.schedule_flush();
    }

    /// Empty the cart and erase its persisted snapshot immediately.
    pub async fn clear(&mut self) {
        self.items.clear();

        if let Some(handle) = self.pending_flush.take() {
            handle.abort();
        }

        if let Err(e) = self.storage.remove().await {
            tracing::warn!("failed to erase cart storage: {e}");
        }
    }

    /// (Re)schedule the write-behind flush.
    ///
    /// The previous pending flush is aborted so the write always carries the
    /// state captured here - never a stale intermediate. An empty snapshot
    /// erases the stored blob instead of writing one.
    fn schedule_flush(&mut self) {
        if let Some(handle) = self.pending_flush.take() {
            handle.abort();
        }

        let storage = self.storage.clone();
        let snapshot = self.items.clone();
        let delay = self.flush_delay;

        self.pending_flush = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let result = if snapshot.is_empty() {
                storage.remove().await
            } else {
                storage.save(&snapshot).await
            };
            if let Err(e) = result {
                tracing::warn!("cart flush failed, in-memory state stays authoritative: {e}");
            }
        }));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;
    use crate::services::analytics::NoopAnalytics;

    const FLUSH: Duration = Duration::from_millis(300);

    fn product(id: i32, name: &str, price_cents: i64) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            description: format!("{name} from the orchard"),
            price: Decimal::new(price_cents, 2),
            image_url: None,
            category: "pantry".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    async fn empty_cart(storage: MemoryCartStorage) -> CartStore<MemoryCartStorage> {
        CartStore::load(storage, Arc::new(NoopAnalytics), FLUSH).await
    }

    /// Analytics sink that records every event for assertions.
    #[derive(Default)]
    struct RecordingAnalytics {
        events: Mutex<Vec<CartEvent>>,
    }

    impl CartAnalytics for RecordingAnalytics {
        fn cart_event(&self, event: &CartEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    /// Storage that fails every operation.
    #[derive(Clone)]
    struct FailingStorage;

    impl CartStorage for FailingStorage {
        async fn load(&self) -> Result<Option<Vec<CartItem>>, StorageError> {
            Err(StorageError::Backend(sqlx::Error::PoolClosed))
        }

        async fn save(&self, _items: &[CartItem]) -> Result<(), StorageError> {
            Err(StorageError::Backend(sqlx::Error::PoolClosed))
        }

        async fn remove(&self) -> Result<(), StorageError> {
            Err(StorageError::Backend(sqlx::Error::PoolClosed))
        }
    }

    #[tokio::test]
    async fn test_totals_track_quantities_and_prices() {
        let mut cart = empty_cart(MemoryCartStorage::new()).await;

        // P1 at $10 twice, P2 at $5 once
        let p1 = product(1, "Honey", 1000);
        let p2 = product(2, "Jam", 500);
        cart.add_item(&p1);
        cart.add_item(&p1);
        cart.add_item(&p2);

        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_price(), Decimal::new(2500, 2));
    }

    #[tokio::test]
    async fn test_repeated_adds_keep_one_line_per_product() {
        let mut cart = empty_cart(MemoryCartStorage::new()).await;
        let p1 = product(1, "Honey", 1000);

        for _ in 0..5 {
            cart.add_item(&p1);
        }

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
    }

    #[tokio::test]
    async fn test_set_quantity_below_one_is_a_noop() {
        let mut cart = empty_cart(MemoryCartStorage::new()).await;
        let p1 = product(1, "Honey", 1000);
        cart.add_item(&p1);
        cart.add_item(&p1);

        cart.set_quantity(p1.id, 0);
        assert_eq!(cart.items()[0].quantity, 2);

        cart.remove_item(p1.id);
        assert!(cart.is_empty());
        assert_eq!(cart.total_items(), 0);
    }

    #[tokio::test]
    async fn test_set_quantity_for_absent_product_is_a_noop() {
        let mut cart = empty_cart(MemoryCartStorage::new()).await;
        cart.set_quantity(ProductId::new(99), 3);
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_removing_absent_product_leaves_cart_unchanged() {
        let mut cart = empty_cart(MemoryCartStorage::new()).await;
        let p1 = product(1, "Honey", 1000);
        cart.add_item(&p1);
        let before = cart.items().to_vec();

        cart.remove_item(ProductId::new(42));

        assert_eq!(cart.items(), before.as_slice());
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_waits_for_the_debounce_window() {
        let storage = MemoryCartStorage::new();
        let mut cart = empty_cart(storage.clone()).await;
        cart.add_item(&product(1, "Honey", 1000));

        // Inside the window: nothing persisted yet
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(storage.snapshot().is_none());

        // Past the window: the latest state is persisted
        tokio::time::sleep(Duration::from_millis(250)).await;
        let blob = storage.snapshot().unwrap();
        let items: Vec<CartItem> = serde_json::from_str(&blob).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_mutations_coalesce_into_one_write() {
        let storage = MemoryCartStorage::new();
        let mut cart = empty_cart(storage.clone()).await;
        let p1 = product(1, "Honey", 1000);
        let p2 = product(2, "Jam", 500);

        cart.add_item(&p1);
        tokio::time::sleep(Duration::from_millis(100)).await;
        cart.add_item(&p2);
        tokio::time::sleep(Duration::from_millis(100)).await;
        cart.set_quantity(p1.id, 4);

        tokio::time::sleep(Duration::from_millis(350)).await;

        assert_eq!(storage.save_count(), 1);
        let items: Vec<CartItem> =
            serde_json::from_str(&storage.snapshot().unwrap()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].quantity, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_emptying_the_cart_erases_the_stored_blob() {
        let storage = MemoryCartStorage::new();
        let mut cart = empty_cart(storage.clone()).await;
        let p1 = product(1, "Honey", 1000);

        cart.add_item(&p1);
        tokio::time::sleep(Duration::from_millis(350)).await;
        assert!(storage.snapshot().is_some());

        cart.remove_item(p1.id);
        tokio::time::sleep(Duration::from_millis(350)).await;
        assert!(storage.snapshot().is_none());
    }

    #[tokio::test]
    async fn test_clear_erases_storage_immediately() {
        let storage = MemoryCartStorage::new();
        storage.inject_raw(r#"[{"product_id":1,"name":"Honey","unit_price":"10.00","quantity":2}]"#);

        let mut cart = empty_cart(storage.clone()).await;
        assert_eq!(cart.total_items(), 2);

        cart.clear().await;

        assert!(cart.is_empty());
        assert!(storage.snapshot().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_loads_as_empty_cart() {
        let storage = MemoryCartStorage::new();
        storage.inject_raw("definitely not json");

        let cart = empty_cart(storage).await;
        assert!(cart.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_storage_failures_leave_memory_authoritative() {
        let mut cart = CartStore::load(FailingStorage, Arc::new(NoopAnalytics), FLUSH).await;
        let p1 = product(1, "Honey", 1000);

        cart.add_item(&p1);
        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(cart.total_items(), 1);

        cart.clear().await;
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_analytics_signals_on_add_and_remove() {
        let analytics = Arc::new(RecordingAnalytics::default());
        let mut cart = CartStore::load(
            MemoryCartStorage::new(),
            Arc::clone(&analytics) as Arc<dyn CartAnalytics>,
            FLUSH,
        )
        .await;

        let p1 = product(1, "Honey", 1000);
        cart.add_item(&p1);
        cart.add_item(&p1);
        cart.remove_item(p1.id);

        let events = analytics.events.lock().unwrap();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], CartEvent::ItemAdded { .. }));
        // The remove signal carries the pre-removal snapshot
        match &events[2] {
            CartEvent::ItemRemoved { item } => assert_eq!(item.quantity, 2),
            other => panic!("expected ItemRemoved, got {other:?}"),
        }
    }
}
