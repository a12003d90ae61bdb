//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::instrument;

use orchard_core::ProductId;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::product::{NewProduct, ProductPatch, ProductQuery};
use crate::state::AppState;

/// List products with pagination, search and category filter.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<impl IntoResponse> {
    let page = state.catalog().list(&query).await?;
    Ok(Json(page))
}

/// Product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let product = state
        .catalog()
        .get(ProductId::new(id))
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(json!({ "item": product })))
}

/// Create a product (admin).
#[instrument(skip(state, new))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(new): Json<NewProduct>,
) -> Result<impl IntoResponse> {
    if new.name.trim().is_empty() {
        return Err(AppError::Validation {
            field: "name",
            message: "name is required".to_string(),
        });
    }
    if new.description.trim().is_empty() {
        return Err(AppError::Validation {
            field: "description",
            message: "description is required".to_string(),
        });
    }
    if new.price <= Decimal::ZERO {
        return Err(AppError::Validation {
            field: "price",
            message: "price must be positive".to_string(),
        });
    }

    let product = state.catalog().create(&new).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Product created successfully",
            "item": product,
        })),
    ))
}

/// Update a product (admin).
#[instrument(skip(state, patch))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
    Json(patch): Json<ProductPatch>,
) -> Result<impl IntoResponse> {
    if let Some(price) = patch.price
        && price <= Decimal::ZERO
    {
        return Err(AppError::Validation {
            field: "price",
            message: "price must be positive".to_string(),
        });
    }

    let product = state.catalog().update(ProductId::new(id), &patch).await?;

    Ok(Json(json!({
        "message": "Product updated successfully",
        "item": product,
    })))
}

/// Delete a product (admin).
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    if !state.catalog().delete(ProductId::new(id)).await? {
        return Err(AppError::NotFound);
    }

    Ok(Json(json!({ "message": "Product deleted successfully" })))
}
