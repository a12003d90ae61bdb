//! Registry of live per-session carts.
//!
//! Each session owns exactly one cart, addressed by the cart key stored in
//! the session. The registry keeps the live `CartStore` (and its checkout
//! state machine) resident while the session is active; idle entries expire
//! and are rebuilt from their persisted snapshot on next access.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::storage::PgCartStorage;
use super::CartStore;
use crate::config::CartConfig;
use crate::services::analytics::CartAnalytics;
use crate::services::checkout::CheckoutOrchestrator;

/// Everything per-session checkout needs: the cart and its checkout state.
pub struct SessionCart {
    store: Mutex<CartStore<PgCartStorage>>,
    checkout: CheckoutOrchestrator,
}

impl SessionCart {
    /// The cart itself, behind its mutation lock.
    #[must_use]
    pub const fn store(&self) -> &Mutex<CartStore<PgCartStorage>> {
        &self.store
    }

    /// The session's checkout state machine.
    #[must_use]
    pub const fn checkout(&self) -> &CheckoutOrchestrator {
        &self.checkout
    }
}

/// Cache of live carts keyed by cart key.
pub struct CartRegistry {
    carts: moka::future::Cache<Uuid, Arc<SessionCart>>,
    pool: PgPool,
    analytics: Arc<dyn CartAnalytics>,
    flush_delay: Duration,
}

impl CartRegistry {
    /// Create a registry with the configured idle lifetime.
    #[must_use]
    pub fn new(pool: PgPool, analytics: Arc<dyn CartAnalytics>, config: &CartConfig) -> Self {
        let carts = moka::future::Cache::builder()
            .max_capacity(100_000)
            .time_to_idle(config.idle_ttl)
            .build();

        Self {
            carts,
            pool,
            analytics,
            flush_delay: config.flush_delay,
        }
    }

    /// Get the live cart for a key, loading it from storage on a miss.
    pub async fn get(&self, key: Uuid) -> Arc<SessionCart> {
        self.carts
            .entry(key)
            .or_insert_with(async {
                let storage = PgCartStorage::new(self.pool.clone(), key);
                let store =
                    CartStore::load(storage, Arc::clone(&self.analytics), self.flush_delay).await;
                Arc::new(SessionCart {
                    store: Mutex::new(store),
                    checkout: CheckoutOrchestrator::new(),
                })
            })
            .await
            .into_value()
    }
}
