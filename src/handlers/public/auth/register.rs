use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::{json, Value};

use super::Credentials;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /register - Register new user account
///
/// Expected Input:
/// ```json
/// { "username": "alice", "password": "secret1" }
/// ```
///
/// Expected Output:
/// ```json
/// { "username": "alice", "id": "user_uuid" }
/// ```
pub async fn register_post(
    State(state): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(credentials) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let user = state
        .auth
        .register(credentials.username(), credentials.password())
        .await?;

    Ok(Json(json!({
        "username": user.username,
        "id": user.id,
    })))
}
