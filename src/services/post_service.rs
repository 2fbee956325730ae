use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use super::upload_service::{UploadError, UploadService, UploadedFile};
use crate::database::models::{NewPost, Post, PostWithAuthor};
use crate::database::{BlogStore, DatabaseError};

#[derive(Debug, Error)]
pub enum PostError {
    #[error("A cover image file is required")]
    MissingFile,
    #[error("Post id is required")]
    MissingId,
    #[error("Post not found")]
    NotFound,
    #[error("You are not the author")]
    NotAuthor,
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Fields submitted for a create or update. Absent text fields are `None`.
#[derive(Debug, Default)]
pub struct PostInput {
    pub id: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub file: Option<UploadedFile>,
}

#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn BlogStore>,
    uploads: UploadService,
}

impl PostService {
    pub fn new(store: Arc<dyn BlogStore>, uploads: UploadService) -> Self {
        Self { store, uploads }
    }

    pub async fn create(&self, author: Uuid, input: PostInput) -> Result<Post, PostError> {
        let file = input.file.ok_or(PostError::MissingFile)?;
        let cover = self.uploads.store(&file).await?;

        let created = self
            .store
            .create_post(NewPost {
                title: input.title.unwrap_or_default(),
                summary: input.summary.unwrap_or_default(),
                content: input.content.unwrap_or_default(),
                cover: cover.clone(),
                author,
            })
            .await;

        let post = match created {
            Ok(post) => post,
            Err(e) => {
                self.uploads.remove(&cover).await;
                return Err(e.into());
            }
        };

        tracing::info!("Created post {} by {}", post.id, author);
        Ok(post)
    }

    /// Apply `input` to an existing post owned by `author`. The cover is only
    /// replaced when a new file accompanies the request.
    pub async fn update(&self, author: Uuid, input: PostInput) -> Result<Post, PostError> {
        let id = input
            .id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(PostError::MissingId)?;
        let id = Uuid::parse_str(id).map_err(|_| PostError::NotFound)?;

        let mut post = self.store.find_post(id).await?.ok_or(PostError::NotFound)?;
        if post.author != author {
            tracing::warn!("User {} attempted to edit post {} owned by {}", author, post.id, post.author);
            return Err(PostError::NotAuthor);
        }

        if let Some(title) = input.title {
            post.title = title;
        }
        if let Some(summary) = input.summary {
            post.summary = summary;
        }
        if let Some(content) = input.content {
            post.content = content;
        }
        let new_cover = match &input.file {
            Some(file) => Some(self.uploads.store(file).await?),
            None => None,
        };
        if let Some(cover) = &new_cover {
            post.cover = cover.clone();
        }

        let updated = match self.store.update_post(&post).await {
            Ok(updated) => updated,
            Err(e) => {
                if let Some(cover) = &new_cover {
                    self.uploads.remove(cover).await;
                }
                return Err(e.into());
            }
        };
        tracing::info!("Updated post {}", updated.id);
        Ok(updated)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<PostWithAuthor, PostError> {
        let id = Uuid::parse_str(id).map_err(|_| PostError::NotFound)?;
        self.store
            .find_post_with_author(id)
            .await?
            .ok_or(PostError::NotFound)
    }

    pub async fn list_all(&self) -> Result<Vec<PostWithAuthor>, PostError> {
        Ok(self.store.list_posts_with_author().await?)
    }
}
