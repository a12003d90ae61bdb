//! Order route handlers.
//!
//! Every operation is scoped to the session identity; an order that exists
//! but belongs to someone else gets the same 404 as one that never existed.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::instrument;

use orchard_core::OrderId;

use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::order::{CreateOrder, OrderPatch};
use crate::state::AppState;

fn parse_order_id(raw: &str) -> Result<OrderId> {
    OrderId::parse(raw).map_err(|_| AppError::BadRequest("Invalid order id".to_string()))
}

/// Order history for the current user, newest first.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(Json(json!({ "orders": orders })))
}

/// Create an order from an explicit payload.
#[instrument(skip(state, draft))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(draft): Json<CreateOrder>,
) -> Result<impl IntoResponse> {
    let order = OrderRepository::new(state.pool())
        .create(user.id, draft)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Order created successfully",
            "order": order,
        })),
    ))
}

/// Order detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let order_id = parse_order_id(&id)?;
    let order = OrderRepository::new(state.pool())
        .get(user.id, order_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(json!({ "order": order })))
}

/// Partial update of an order's mutable fields.
#[instrument(skip(state, patch))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    Json(patch): Json<OrderPatch>,
) -> Result<impl IntoResponse> {
    let order_id = parse_order_id(&id)?;
    let order = OrderRepository::new(state.pool())
        .update(user.id, order_id, &patch)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(json!({
        "message": "Order updated successfully",
        "order": order,
    })))
}

/// Delete a pending order.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let order_id = parse_order_id(&id)?;
    OrderRepository::new(state.pool())
        .delete(user.id, order_id)
        .await?;

    Ok(Json(json!({ "message": "Order deleted successfully" })))
}
