use async_trait::async_trait;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{NewPost, Post, PostWithAuthor, User};

/// Persistence operations the blog needs from a backend
#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Insert a user. A taken username yields `DatabaseError::Duplicate`.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, DatabaseError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;

    async fn create_post(&self, post: NewPost) -> Result<Post, DatabaseError>;

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, DatabaseError>;

    /// Persist the mutable fields of `post` and bump `updated_at`
    async fn update_post(&self, post: &Post) -> Result<Post, DatabaseError>;

    async fn find_post_with_author(&self, id: Uuid) -> Result<Option<PostWithAuthor>, DatabaseError>;

    /// Every post, newest first
    async fn list_posts_with_author(&self) -> Result<Vec<PostWithAuthor>, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}
