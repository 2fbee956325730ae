use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Stored post with the author kept as a bare user id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub cover: String,
    pub author: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied by the client when a post is created
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub cover: String,
    pub author: Uuid,
}

/// Author reference expanded to the public handle only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostWithAuthor {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub cover: String,
    pub author: Author,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostWithAuthor {
    pub fn new(post: Post, username: String) -> Self {
        Self {
            id: post.id,
            title: post.title,
            summary: post.summary,
            content: post.content,
            cover: post.cover,
            author: Author {
                id: post.author,
                username,
            },
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Flat row produced by the posts/users join
#[derive(Debug, FromRow)]
pub(crate) struct PostAuthorRow {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub cover: String,
    pub author: Uuid,
    pub author_username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PostAuthorRow> for PostWithAuthor {
    fn from(row: PostAuthorRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            summary: row.summary,
            content: row.content,
            cover: row.cover,
            author: Author {
                id: row.author,
                username: row.author_username,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
