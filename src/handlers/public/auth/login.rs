use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use super::Credentials;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /login - Authenticate user and receive JWT token
///
/// The token is returned both in the body and as an
/// `Authorization: Bearer <token>` response header.
///
/// Expected Output (Success):
/// ```json
/// {
///   "token": "eyJhbGciOiJIUzI1NiI...",
///   "message": "Login successful",
///   "username": "alice",
///   "id": "user_uuid"
/// }
/// ```
pub async fn login_post(
    State(state): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(credentials) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let outcome = state
        .auth
        .login(credentials.username(), credentials.password())
        .await?;

    Ok((
        [(header::AUTHORIZATION, format!("Bearer {}", outcome.token))],
        Json(json!({
            "token": outcome.token,
            "message": "Login successful",
            "username": outcome.user.username,
            "id": outcome.user.id,
        })),
    ))
}
