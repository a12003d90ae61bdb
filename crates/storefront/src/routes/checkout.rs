//! Checkout route handler.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse, response::Response};
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::routes::cart::cart_key;
use crate::services::checkout::{CheckoutOutcome, default_shipping_address};
use crate::state::AppState;

/// Convert the session's cart into an order.
///
/// An empty cart is rejected before the orchestrator is ever invoked. While
/// a previous submit is still in flight, this returns 202 and does nothing.
#[instrument(skip(state, session))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Response> {
    let key = cart_key(&session).await?;
    let entry = state.carts().get(key).await;

    {
        let store = entry.store().lock().await;
        if store.is_empty() {
            return Err(AppError::BadRequest("cart is empty".to_string()));
        }
    }

    let writer = OrderRepository::new(state.pool());
    let outcome = entry
        .checkout()
        .submit(&writer, entry.store(), user.id, default_shipping_address())
        .await;

    match outcome {
        CheckoutOutcome::Completed(order) => {
            tracing::info!(order_id = %order.id, "checkout completed");
            Ok((
                StatusCode::CREATED,
                Json(json!({
                    "message": "Order placed successfully",
                    "order": order,
                })),
            )
                .into_response())
        }
        CheckoutOutcome::InFlight => Ok((
            StatusCode::ACCEPTED,
            Json(json!({ "status": "submitting" })),
        )
            .into_response()),
        CheckoutOutcome::Failed(e) => Err(AppError::from(e)),
    }
}
