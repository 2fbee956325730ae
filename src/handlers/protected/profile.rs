use axum::Json;
use serde_json::{json, Value};

use crate::middleware::AuthUser;

/// GET /profile - claims of the presented bearer token
pub async fn profile_get(user: AuthUser) -> Json<Value> {
    Json(json!({
        "message": "Profile fetched successfully",
        "user": user.claims,
    }))
}
