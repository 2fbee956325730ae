use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::manager::{DatabaseError, DatabaseManager};
use super::models::post::PostAuthorRow;
use super::models::{NewPost, Post, PostWithAuthor, User};
use super::store::BlogStore;

const POST_COLUMNS: &str = "id, title, summary, content, cover, author, created_at, updated_at";

const POST_WITH_AUTHOR_SELECT: &str = r#"
    SELECT p.id, p.title, p.summary, p.content, p.cover, p.author,
           u.username AS author_username, p.created_at, p.updated_at
    FROM posts p
    JOIN users u ON u.id = p.author
"#;

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlogStore for PgStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, password)
            VALUES ($1, $2, $3)
            RETURNING id, username, password, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::from_insert(e, || format!("username '{}' is already taken", username))
        })
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create_post(&self, post: NewPost) -> Result<Post, DatabaseError> {
        let sql = format!(
            "INSERT INTO posts (id, title, summary, content, cover, author) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            POST_COLUMNS
        );

        let created = sqlx::query_as::<_, Post>(&sql)
            .bind(Uuid::new_v4())
            .bind(&post.title)
            .bind(&post.summary)
            .bind(&post.content)
            .bind(&post.cover)
            .bind(post.author)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, DatabaseError> {
        let sql = format!("SELECT {} FROM posts WHERE id = $1", POST_COLUMNS);
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(post)
    }

    async fn update_post(&self, post: &Post) -> Result<Post, DatabaseError> {
        let sql = format!(
            "UPDATE posts SET title = $2, summary = $3, content = $4, cover = $5, \
             updated_at = clock_timestamp() WHERE id = $1 RETURNING {}",
            POST_COLUMNS
        );

        sqlx::query_as::<_, Post>(&sql)
            .bind(post.id)
            .bind(&post.title)
            .bind(&post.summary)
            .bind(&post.content)
            .bind(&post.cover)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("post {}", post.id)))
    }

    async fn find_post_with_author(&self, id: Uuid) -> Result<Option<PostWithAuthor>, DatabaseError> {
        let sql = format!("{} WHERE p.id = $1", POST_WITH_AUTHOR_SELECT);
        let row = sqlx::query_as::<_, PostAuthorRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(PostWithAuthor::from))
    }

    async fn list_posts_with_author(&self) -> Result<Vec<PostWithAuthor>, DatabaseError> {
        let sql = format!("{} ORDER BY p.created_at DESC, p.id DESC", POST_WITH_AUTHOR_SELECT);
        let rows = sqlx::query_as::<_, PostAuthorRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(PostWithAuthor::from).collect())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
