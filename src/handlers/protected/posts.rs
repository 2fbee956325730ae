use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};

use super::form::read_post_form;
use crate::database::models::Post;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// POST /post - create a post with a cover image
///
/// Multipart fields: `title`, `summary`, `content`, and a required `file`.
pub async fn post_create(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Post>, ApiError> {
    let input = read_post_form(multipart).await?;
    let post = state.posts.create(user.user_id, input).await?;
    Ok(Json(post))
}

/// PUT /post - update a post owned by the caller
///
/// Multipart fields: `id`, `title`, `summary`, `content`, and an optional
/// `file` replacing the cover. Any token failure on this route is a 401.
pub async fn post_update(
    State(state): State<AppState>,
    user: Result<AuthUser, ApiError>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Post>, ApiError> {
    let user = user.map_err(|e| match e {
        ApiError::Forbidden(_) => ApiError::unauthorized("Unauthorized"),
        other => other,
    })?;

    let input = read_post_form(multipart).await?;
    let post = state.posts.update(user.user_id, input).await?;
    Ok(Json(post))
}
