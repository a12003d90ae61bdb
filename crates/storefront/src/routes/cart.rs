//! Cart route handlers.
//!
//! Every session owns one cart, addressed by a cart key minted on first use
//! and kept in the session. Handlers work against the live cart held by the
//! registry; persistence happens behind it, debounced.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use orchard_core::ProductId;

use crate::error::{AppError, Result};
use crate::models::session::session_keys;
use crate::services::cart::{CartStorage, CartStore};
use crate::state::AppState;

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub quantity: u32,
    pub line_total: Decimal,
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total_items: u32,
    pub total_price: Decimal,
}

impl CartView {
    fn from_store<S>(store: &CartStore<S>) -> Self
    where
        S: CartStorage + Clone + Send + Sync + 'static,
    {
        Self {
            items: store
                .items()
                .iter()
                .map(|item| CartItemView {
                    product_id: item.product_id,
                    name: item.name.clone(),
                    unit_price: item.unit_price,
                    image_url: item.image_url.clone(),
                    quantity: item.quantity,
                    line_total: item.line_total(),
                })
                .collect(),
            total_items: store.total_items(),
            total_price: store.total_price(),
        }
    }
}

/// Get the session's cart key, minting one on first use.
pub(crate) async fn cart_key(session: &Session) -> Result<Uuid> {
    if let Ok(Some(key)) = session.get::<Uuid>(session_keys::CART_KEY).await {
        return Ok(key);
    }

    let key = Uuid::new_v4();
    session
        .insert(session_keys::CART_KEY, key)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    Ok(key)
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
}

/// Set quantity request body.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCartRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Current cart view.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let key = cart_key(&session).await?;
    let entry = state.carts().get(key).await;
    let store = entry.store().lock().await;

    Ok(Json(CartView::from_store(&store)))
}

/// Add one unit of a product to the cart.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddToCartRequest>,
) -> Result<impl IntoResponse> {
    let product = state
        .catalog()
        .get(request.product_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let key = cart_key(&session).await?;
    let entry = state.carts().get(key).await;
    let mut store = entry.store().lock().await;
    store.add_item(&product);

    Ok(Json(CartView::from_store(&store)))
}

/// Set a cart line's quantity.
///
/// Quantities below 1 are ignored; removal is its own operation.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<UpdateCartRequest>,
) -> Result<impl IntoResponse> {
    let key = cart_key(&session).await?;
    let entry = state.carts().get(key).await;
    let mut store = entry.store().lock().await;
    store.set_quantity(request.product_id, request.quantity);

    Ok(Json(CartView::from_store(&store)))
}

/// Remove a line from the cart.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Path(product_id): Path<i32>,
) -> Result<impl IntoResponse> {
    let key = cart_key(&session).await?;
    let entry = state.carts().get(key).await;
    let mut store = entry.store().lock().await;
    store.remove_item(ProductId::new(product_id));

    Ok(Json(CartView::from_store(&store)))
}

/// Empty the cart.
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let key = cart_key(&session).await?;
    let entry = state.carts().get(key).await;
    let mut store = entry.store().lock().await;
    store.clear().await;

    Ok(Json(CartView::from_store(&store)))
}

/// Item count for the cart badge.
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let key = cart_key(&session).await?;
    let entry = state.carts().get(key).await;
    let count = entry.store().lock().await.total_items();

    Ok(Json(json!({ "count": count })))
}
