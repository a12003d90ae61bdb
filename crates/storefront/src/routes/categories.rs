//! Category route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use orchard_core::CategoryId;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// New category form data.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewCategory {
    pub name: String,
}

/// List all categories.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let categories = state.catalog().categories().await?;
    Ok(Json(json!({ "categories": categories })))
}

/// Create a category (admin).
#[instrument(skip(state))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(new): Json<NewCategory>,
) -> Result<impl IntoResponse> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation {
            field: "name",
            message: "name is required".to_string(),
        });
    }

    let category = state.catalog().create_category(name).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Category created successfully",
            "category": category,
        })),
    ))
}

/// Delete a category (admin).
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    if !state.catalog().delete_category(CategoryId::new(id)).await? {
        return Err(AppError::NotFound);
    }

    Ok(Json(json!({ "message": "Category deleted successfully" })))
}
