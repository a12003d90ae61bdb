//! Checkout orchestration: cart snapshot in, order out.
//!
//! The state machine is `Idle -> Submitting -> {Success | Failed}`. While a
//! submit is in flight, further invocations are ignored, so a double-click
//! produces exactly one order. On failure the cart is left untouched for
//! retry; only a successful write clears it.

use std::future::Future;

use serde::Serialize;
use tokio::sync::Mutex;

use orchard_core::{OrderId, UserId};

use super::cart::{CartStorage, CartStore};
use crate::db::orders::OrderWriteError;
use crate::models::order::{Address, CreateOrder, Order, OrderItem};

/// Seam between checkout and order persistence.
pub trait OrderWriter {
    /// Validate and atomically persist a draft as a new order.
    fn create_order(
        &self,
        user_id: UserId,
        draft: CreateOrder,
    ) -> impl Future<Output = Result<Order, OrderWriteError>> + Send;
}

/// Where the checkout attempt currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckoutState {
    /// No attempt in progress.
    Idle,
    /// An attempt is in flight; further submits are ignored.
    Submitting,
    /// The last attempt created an order.
    Success { order_id: OrderId },
    /// The last attempt failed; the cart was left intact.
    Failed { message: String },
}

/// Result of one `submit` invocation.
#[derive(Debug)]
pub enum CheckoutOutcome {
    /// An order was created and the cart cleared.
    Completed(Box<Order>),
    /// The writer rejected or failed; the cart is untouched.
    Failed(OrderWriteError),
    /// Another submit was already in flight; nothing happened.
    InFlight,
}

/// Per-session checkout state machine.
pub struct CheckoutOrchestrator {
    state: Mutex<CheckoutState>,
}

impl Default for CheckoutOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutOrchestrator {
    /// Start in `Idle`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CheckoutState::Idle),
        }
    }

    /// The current state, for display.
    pub async fn state(&self) -> CheckoutState {
        self.state.lock().await.clone()
    }

    /// Convert the cart into an order.
    ///
    /// Snapshots the cart under its lock, hands the draft to the writer with
    /// the given shipping address, and on success clears the cart. The empty-
    /// cart entry condition is the caller's job; an empty snapshot simply
    /// fails validation downstream.
    pub async fn submit<W, S>(
        &self,
        writer: &W,
        cart: &Mutex<CartStore<S>>,
        user_id: UserId,
        shipping_address: Address,
    ) -> CheckoutOutcome
    where
        W: OrderWriter + Sync,
        S: CartStorage + Clone + Send + Sync + 'static,
    {
        {
            let mut state = self.state.lock().await;
            if matches!(*state, CheckoutState::Submitting) {
                return CheckoutOutcome::InFlight;
            }
            *state = CheckoutState::Submitting;
        }

        let draft = {
            let cart = cart.lock().await;
            CreateOrder {
                items: cart.items().iter().map(order_item).collect(),
                total: cart.total_price(),
                shipping_address,
            }
        };

        match writer.create_order(user_id, draft).await {
            Ok(order) => {
                cart.lock().await.clear().await;
                *self.state.lock().await = CheckoutState::Success { order_id: order.id };
                CheckoutOutcome::Completed(Box::new(order))
            }
            Err(e) => {
                *self.state.lock().await = CheckoutState::Failed {
                    message: e.to_string(),
                };
                CheckoutOutcome::Failed(e)
            }
        }
    }
}

/// Snapshot-copy a cart line into an order line.
fn order_item(item: &super::cart::CartItem) -> OrderItem {
    OrderItem {
        product_id: item.product_id,
        name: item.name.clone(),
        unit_price: item.unit_price,
        image_url: item.image_url.clone(),
        quantity: item.quantity,
    }
}

/// The storefront ships from one place; there is no address-entry step.
#[must_use]
pub fn default_shipping_address() -> Address {
    Address {
        street: "1 Orchard Lane".to_string(),
        city: "Mudgee".to_string(),
        state: "NSW".to_string(),
        postal_code: "2850".to_string(),
        country: "Australia".to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use chrono::Utc;
    use rust_decimal::Decimal;

    use orchard_core::{OrderStatus, ProductId};

    use super::*;
    use crate::models::order::OrderValidationError;
    use crate::models::product::Product;
    use crate::services::analytics::NoopAnalytics;
    use crate::services::cart::MemoryCartStorage;

    /// Writer that builds the order in memory, optionally slowly or not at all.
    struct StubWriter {
        delay: Duration,
        fail: bool,
        created: AtomicU32,
    }

    impl StubWriter {
        fn instant() -> Self {
            Self {
                delay: Duration::ZERO,
                fail: false,
                created: AtomicU32::new(0),
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                delay,
                ..Self::instant()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::instant()
            }
        }
    }

    impl OrderWriter for StubWriter {
        async fn create_order(
            &self,
            user_id: UserId,
            draft: CreateOrder,
        ) -> Result<Order, OrderWriteError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail {
                return Err(OrderWriteError::Validation(
                    OrderValidationError::InvalidTotal,
                ));
            }
            draft.validate()?;
            self.created.fetch_add(1, Ordering::SeqCst);
            let now = Utc::now();
            Ok(Order {
                id: OrderId::generate(),
                user_id,
                items: draft.items,
                total: draft.total,
                status: OrderStatus::Pending,
                shipping_address: draft.shipping_address,
                created_at: now,
                updated_at: now,
                tracking_number: None,
                estimated_delivery: None,
                notes: None,
            })
        }
    }

    fn product(id: i32, price_cents: i64) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: "test".to_string(),
            price: Decimal::new(price_cents, 2),
            image_url: None,
            category: "pantry".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    async fn cart_with_items() -> Mutex<CartStore<MemoryCartStorage>> {
        let mut cart = CartStore::load(
            MemoryCartStorage::new(),
            Arc::new(NoopAnalytics),
            Duration::from_millis(300),
        )
        .await;
        cart.add_item(&product(1, 1000));
        cart.add_item(&product(1, 1000));
        cart.add_item(&product(2, 500));
        Mutex::new(cart)
    }

    #[tokio::test]
    async fn test_successful_checkout_clears_cart_and_records_order_id() {
        let orchestrator = CheckoutOrchestrator::new();
        let writer = StubWriter::instant();
        let cart = cart_with_items().await;

        let outcome = orchestrator
            .submit(&writer, &cart, UserId::new(1), default_shipping_address())
            .await;

        let CheckoutOutcome::Completed(order) = outcome else {
            panic!("expected completed checkout");
        };
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total, Decimal::new(2500, 2));
        assert_eq!(order.items.len(), 2);

        assert!(cart.lock().await.is_empty());
        assert_eq!(cart.lock().await.total_items(), 0);

        match orchestrator.state().await {
            CheckoutState::Success { order_id } => assert_eq!(order_id, order.id),
            other => panic!("expected success state, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_checkout_leaves_cart_intact() {
        let orchestrator = CheckoutOrchestrator::new();
        let writer = StubWriter::failing();
        let cart = cart_with_items().await;

        let outcome = orchestrator
            .submit(&writer, &cart, UserId::new(1), default_shipping_address())
            .await;

        assert!(matches!(outcome, CheckoutOutcome::Failed(_)));
        assert_eq!(cart.lock().await.total_items(), 3);
        assert!(matches!(
            orchestrator.state().await,
            CheckoutState::Failed { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_submit_creates_exactly_one_order() {
        let orchestrator = CheckoutOrchestrator::new();
        let writer = StubWriter::slow(Duration::from_millis(100));
        let cart = cart_with_items().await;

        let (first, second) = tokio::join!(
            orchestrator.submit(&writer, &cart, UserId::new(1), default_shipping_address()),
            orchestrator.submit(&writer, &cart, UserId::new(1), default_shipping_address()),
        );

        let completed = matches!(first, CheckoutOutcome::Completed(_))
            ^ matches!(second, CheckoutOutcome::Completed(_));
        let ignored = matches!(first, CheckoutOutcome::InFlight)
            || matches!(second, CheckoutOutcome::InFlight);
        assert!(completed, "exactly one submit must complete");
        assert!(ignored, "the other submit must be ignored");
        assert_eq!(writer.created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_after_failure_succeeds() {
        let orchestrator = CheckoutOrchestrator::new();
        let cart = cart_with_items().await;

        let outcome = orchestrator
            .submit(
                &StubWriter::failing(),
                &cart,
                UserId::new(1),
                default_shipping_address(),
            )
            .await;
        assert!(matches!(outcome, CheckoutOutcome::Failed(_)));

        // The cart survived, so a retry can succeed without re-adding items
        let outcome = orchestrator
            .submit(
                &StubWriter::instant(),
                &cart,
                UserId::new(1),
                default_shipping_address(),
            )
            .await;
        assert!(matches!(outcome, CheckoutOutcome::Completed(_)));
        assert!(cart.lock().await.is_empty());
    }
}
