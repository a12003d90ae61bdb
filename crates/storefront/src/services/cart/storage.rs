//! Cart persistence backends.
//!
//! The cart is durable as a single serialized blob under a per-session cart
//! key. Backends are infallible from the cart's point of view: every error
//! they return is logged and swallowed by the store, which keeps serving from
//! memory.

use std::future::Future;
use std::sync::{Arc, Mutex};

use sqlx::PgPool;
use sqlx::types::Json;
use thiserror::Error;
use uuid::Uuid;

use super::CartItem;

/// Errors a storage backend can produce. All of them are non-fatal.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend itself failed (connection, query, ...).
    #[error("storage backend error: {0}")]
    Backend(#[from] sqlx::Error),

    /// The stored blob could not be (de)serialized.
    #[error("cart snapshot serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable storage for a single cart, addressed by a fixed key the backend
/// carries internally.
pub trait CartStorage {
    /// Read the stored snapshot, if any.
    fn load(&self) -> impl Future<Output = Result<Option<Vec<CartItem>>, StorageError>> + Send;

    /// Overwrite the stored snapshot with the given items.
    fn save(&self, items: &[CartItem]) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Erase the stored snapshot entirely.
    fn remove(&self) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Postgres-backed cart storage: one JSONB row per cart key.
#[derive(Clone)]
pub struct PgCartStorage {
    pool: PgPool,
    key: Uuid,
}

impl PgCartStorage {
    /// Create storage bound to a cart key.
    #[must_use]
    pub const fn new(pool: PgPool, key: Uuid) -> Self {
        Self { pool, key }
    }

    /// The cart key this storage is bound to.
    #[must_use]
    pub const fn key(&self) -> Uuid {
        self.key
    }
}

impl CartStorage for PgCartStorage {
    async fn load(&self) -> Result<Option<Vec<CartItem>>, StorageError> {
        let row: Option<(Json<Vec<CartItem>>,)> =
            sqlx::query_as("SELECT items FROM cart_snapshots WHERE cart_key = $1")
                .bind(self.key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(items,)| items.0))
    }

    async fn save(&self, items: &[CartItem]) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO cart_snapshots (cart_key, items, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (cart_key)
            DO UPDATE SET items = EXCLUDED.items, updated_at = now()
            ",
        )
        .bind(self.key)
        .bind(Json(items))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM cart_snapshots WHERE cart_key = $1")
            .bind(self.key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// In-memory cart storage holding the serialized blob, mirroring what a
/// durable backend would persist. Used by tests and local tooling.
#[derive(Clone, Default)]
pub struct MemoryCartStorage {
    slot: Arc<Mutex<Option<String>>>,
    saves: Arc<Mutex<u32>>,
}

impl MemoryCartStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw stored blob, if any.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn snapshot(&self) -> Option<String> {
        self.slot.lock().expect("storage lock poisoned").clone()
    }

    /// Number of completed `save` calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn save_count(&self) -> u32 {
        *self.saves.lock().expect("storage lock poisoned")
    }

    /// Seed the stored blob directly, bypassing serialization. Lets tests
    /// plant corrupt snapshots.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn inject_raw(&self, raw: &str) {
        *self.slot.lock().expect("storage lock poisoned") = Some(raw.to_owned());
    }
}

impl CartStorage for MemoryCartStorage {
    async fn load(&self) -> Result<Option<Vec<CartItem>>, StorageError> {
        let raw = self.snapshot();
        raw.map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(StorageError::from)
    }

    async fn save(&self, items: &[CartItem]) -> Result<(), StorageError> {
        let blob = serde_json::to_string(items)?;
        *self.slot.lock().expect("storage lock poisoned") = Some(blob);
        *self.saves.lock().expect("storage lock poisoned") += 1;
        Ok(())
    }

    async fn remove(&self) -> Result<(), StorageError> {
        *self.slot.lock().expect("storage lock poisoned") = None;
        Ok(())
    }
}
