//! Auth route handlers.
//!
//! Register/login/logout over the credential path. Successful auth writes the
//! session identity; everything downstream consumes only that.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::session::CurrentUser;
use crate::models::user::User;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Credentials request body.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

async fn establish_session(session: &Session, user: &User) -> Result<()> {
    let identity = CurrentUser {
        id: user.id,
        email: user.email.clone(),
        role: user.role,
    };
    set_current_user(session, &identity)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))
}

/// Register a new account and log it in.
#[instrument(skip(state, session, credentials))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(credentials): Json<Credentials>,
) -> Result<impl IntoResponse> {
    let user = AuthService::new(state.pool())
        .register(&credentials.email, &credentials.password)
        .await?;

    establish_session(&session, &user).await?;

    Ok((StatusCode::CREATED, Json(json!({ "user": user }))))
}

/// Log in with email and password.
#[instrument(skip(state, session, credentials))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(credentials): Json<Credentials>,
) -> Result<impl IntoResponse> {
    let user = AuthService::new(state.pool())
        .login(&credentials.email, &credentials.password)
        .await?;

    establish_session(&session, &user).await?;

    Ok(Json(json!({ "user": user })))
}

/// Log out the current session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<impl IntoResponse> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;

    Ok(Json(json!({ "message": "Logged out" })))
}
