//! Order persistence: the writer and reader sides of the order lifecycle.
//!
//! Line items and the shipping address are stored as JSONB snapshots taken at
//! creation time, so later catalog changes can never rewrite order history.
//! Every read and mutation is scoped by `user_id`: an order belonging to
//! someone else is indistinguishable from one that doesn't exist.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;
use thiserror::Error;
use uuid::Uuid;

use orchard_core::{OrderId, OrderStatus, UserId};

use super::RepositoryError;
use crate::models::order::{Address, CreateOrder, Order, OrderItem, OrderPatch, OrderValidationError};
use crate::services::checkout::OrderWriter;

/// Errors from the order-creation boundary.
#[derive(Debug, Error)]
pub enum OrderWriteError {
    /// The draft failed validation; nothing was written.
    #[error(transparent)]
    Validation(#[from] OrderValidationError),

    /// The insert itself failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for OrderWriteError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

const ORDER_COLUMNS: &str = "id, user_id, items, total, status, shipping_address, \
     created_at, updated_at, tracking_number, estimated_delivery, notes";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: i32,
    items: Json<Vec<OrderItem>>,
    total: Decimal,
    status: String,
    shipping_address: Json<Address>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    tracking_number: Option<String>,
    estimated_delivery: Option<DateTime<Utc>>,
    notes: Option<String>,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, RepositoryError> {
        let status =
            OrderStatus::from_str(&self.status).map_err(RepositoryError::DataCorruption)?;

        Ok(Order {
            id: OrderId::new(self.id),
            user_id: UserId::new(self.user_id),
            items: self.items.0,
            total: self.total,
            status,
            shipping_address: self.shipping_address.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
            tracking_number: self.tracking_number,
            estimated_delivery: self.estimated_delivery,
            notes: self.notes,
        })
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Validate a draft and persist it as a new `pending` order.
    ///
    /// The insert is a single statement: the order either exists completely
    /// or not at all.
    ///
    /// # Errors
    ///
    /// Returns `OrderWriteError::Validation` if the draft fails any check
    /// (nothing is written), or `OrderWriteError::Repository` if the insert
    /// fails.
    pub async fn create(
        &self,
        user_id: UserId,
        draft: CreateOrder,
    ) -> Result<Order, OrderWriteError> {
        draft.validate()?;

        let id = OrderId::generate();
        let now = Utc::now();
        let status = OrderStatus::Pending;

        sqlx::query(
            r"
            INSERT INTO orders (id, user_id, items, total, status, shipping_address,
                                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            ",
        )
        .bind(id.as_uuid())
        .bind(user_id.as_i32())
        .bind(Json(&draft.items))
        .bind(draft.total)
        .bind(status.as_str())
        .bind(Json(&draft.shipping_address))
        .bind(now)
        .execute(self.pool)
        .await?;

        Ok(Order {
            id,
            user_id,
            items: draft.items,
            total: draft.total,
            status,
            shipping_address: draft.shipping_address,
            created_at: now,
            updated_at: now,
            tracking_number: None,
            estimated_delivery: None,
            notes: None,
        })
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_order).collect()
    }

    /// Get one of the user's orders.
    ///
    /// Returns `None` both when the order doesn't exist and when it belongs
    /// to another user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND user_id = $2"
        ))
        .bind(order_id.as_uuid())
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_order).transpose()
    }

    /// Apply a partial update to one of the user's orders.
    ///
    /// Only `status`, `tracking_number`, `estimated_delivery` and `notes` can
    /// change; `updated_at` is always stamped. Items and `created_at` are
    /// never touched.
    ///
    /// Returns `None` when the order doesn't exist or belongs to another user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn update(
        &self,
        user_id: UserId,
        order_id: OrderId,
        patch: &OrderPatch,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            UPDATE orders SET
                status = COALESCE($3, status),
                tracking_number = COALESCE($4, tracking_number),
                estimated_delivery = COALESCE($5, estimated_delivery),
                notes = COALESCE($6, notes),
                updated_at = $7
            WHERE id = $1 AND user_id = $2
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(order_id.as_uuid())
        .bind(user_id.as_i32())
        .bind(patch.status.map(OrderStatus::as_str))
        .bind(&patch.tracking_number)
        .bind(patch.estimated_delivery)
        .bind(&patch.notes)
        .bind(Utc::now())
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_order).transpose()
    }

    /// Delete one of the user's orders, permitted only while `pending`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when the order doesn't exist or
    /// belongs to another user, `RepositoryError::Conflict` when its status
    /// is anything but `pending`, and `RepositoryError::Database` for query
    /// failures.
    pub async fn delete(&self, user_id: UserId, order_id: OrderId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(String,)> =
            sqlx::query_as("SELECT status FROM orders WHERE id = $1 AND user_id = $2 FOR UPDATE")
                .bind(order_id.as_uuid())
                .bind(user_id.as_i32())
                .fetch_optional(&mut *tx)
                .await?;

        let Some((status,)) = row else {
            return Err(RepositoryError::NotFound);
        };

        let status = OrderStatus::from_str(&status).map_err(RepositoryError::DataCorruption)?;
        if !status.is_deletable() {
            return Err(RepositoryError::Conflict(
                "Only pending orders can be deleted".to_owned(),
            ));
        }

        sqlx::query("DELETE FROM orders WHERE id = $1 AND user_id = $2")
            .bind(order_id.as_uuid())
            .bind(user_id.as_i32())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}

impl OrderWriter for OrderRepository<'_> {
    async fn create_order(
        &self,
        user_id: UserId,
        draft: CreateOrder,
    ) -> Result<Order, OrderWriteError> {
        self.create(user_id, draft).await
    }
}
