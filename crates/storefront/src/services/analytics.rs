//! Fire-and-forget cart analytics signals.
//!
//! The cart emits a signal on add and remove; sinks must never fail and never
//! influence cart state. Delivery to an external analytics provider is out of
//! scope, so the default sink is structured log output.

use rust_decimal::Decimal;

use orchard_core::ProductId;

use super::cart::CartItem;

/// A cart mutation worth tracking.
#[derive(Debug, Clone, PartialEq)]
pub enum CartEvent {
    /// A product was added (or its quantity bumped via add).
    ItemAdded {
        product_id: ProductId,
        name: String,
        unit_price: Decimal,
    },
    /// A line was removed; carries the pre-removal snapshot.
    ItemRemoved { item: CartItem },
}

/// Sink for cart analytics signals.
pub trait CartAnalytics: Send + Sync {
    /// Record an event. Must not block or fail.
    fn cart_event(&self, event: &CartEvent);
}

/// Default sink: structured tracing output under the `analytics` target.
pub struct TracingAnalytics;

impl CartAnalytics for TracingAnalytics {
    fn cart_event(&self, event: &CartEvent) {
        match event {
            CartEvent::ItemAdded {
                product_id,
                name,
                unit_price,
            } => {
                tracing::info!(
                    target: "analytics",
                    %product_id,
                    name,
                    %unit_price,
                    "add_to_cart"
                );
            }
            CartEvent::ItemRemoved { item } => {
                tracing::info!(
                    target: "analytics",
                    product_id = %item.product_id,
                    name = item.name,
                    quantity = item.quantity,
                    "remove_from_cart"
                );
            }
        }
    }
}

/// Sink that drops every event. Useful where signal noise is unwanted.
pub struct NoopAnalytics;

impl CartAnalytics for NoopAnalytics {
    fn cart_event(&self, _event: &CartEvent) {}
}
