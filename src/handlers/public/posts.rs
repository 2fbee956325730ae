use axum::{
    extract::{Path, State},
    Json,
};

use crate::database::models::PostWithAuthor;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /posts - every post, newest first, author expanded to its username
pub async fn posts_list(State(state): State<AppState>) -> Result<Json<Vec<PostWithAuthor>>, ApiError> {
    let posts = state.posts.list_all().await?;
    Ok(Json(posts))
}

/// GET /post/:id - single post with its author's username
pub async fn post_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PostWithAuthor>, ApiError> {
    let post = state.posts.get_by_id(&id).await?;
    Ok(Json(post))
}
