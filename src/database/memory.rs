use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{NewPost, Post, PostWithAuthor, User};
use super::store::BlogStore;

/// Process-local store used when no database is configured, and by tests
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    usernames: HashMap<String, Uuid>,
    // Insertion order doubles as the tie-breaker for equal timestamps
    posts: Vec<Post>,
}

impl Inner {
    fn with_author(&self, post: &Post) -> Result<PostWithAuthor, DatabaseError> {
        let user = self
            .users
            .get(&post.author)
            .ok_or_else(|| DatabaseError::QueryError(format!("post {} references missing user {}", post.id, post.author)))?;
        Ok(PostWithAuthor::new(post.clone(), user.username.clone()))
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlogStore for MemoryStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, DatabaseError> {
        let mut inner = self.inner.write().await;
        if inner.usernames.contains_key(username) {
            return Err(DatabaseError::Duplicate(format!("username '{}' is already taken", username)));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password: password_hash.to_string(),
            created_at: Utc::now(),
        };
        inner.usernames.insert(user.username.clone(), user.id);
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let inner = self.inner.read().await;
        Ok(inner
            .usernames
            .get(username)
            .and_then(|id| inner.users.get(id))
            .cloned())
    }

    async fn create_post(&self, post: NewPost) -> Result<Post, DatabaseError> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&post.author) {
            return Err(DatabaseError::QueryError(format!("unknown author {}", post.author)));
        }

        let now = Utc::now();
        let created = Post {
            id: Uuid::new_v4(),
            title: post.title,
            summary: post.summary,
            content: post.content,
            cover: post.cover,
            author: post.author,
            created_at: now,
            updated_at: now,
        };
        inner.posts.push(created.clone());
        Ok(created)
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, DatabaseError> {
        let inner = self.inner.read().await;
        Ok(inner.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn update_post(&self, post: &Post) -> Result<Post, DatabaseError> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .posts
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or_else(|| DatabaseError::NotFound(format!("post {}", post.id)))?;

        stored.title = post.title.clone();
        stored.summary = post.summary.clone();
        stored.content = post.content.clone();
        stored.cover = post.cover.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn find_post_with_author(&self, id: Uuid) -> Result<Option<PostWithAuthor>, DatabaseError> {
        let inner = self.inner.read().await;
        inner
            .posts
            .iter()
            .find(|p| p.id == id)
            .map(|p| inner.with_author(p))
            .transpose()
    }

    async fn list_posts_with_author(&self) -> Result<Vec<PostWithAuthor>, DatabaseError> {
        let inner = self.inner.read().await;
        let mut indexed: Vec<(usize, &Post)> = inner.posts.iter().enumerate().collect();
        indexed.sort_by(|(ia, a), (ib, b)| b.created_at.cmp(&a.created_at).then(ib.cmp(ia)));

        indexed
            .into_iter()
            .map(|(_, p)| inner.with_author(p))
            .collect()
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
