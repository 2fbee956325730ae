pub mod post;
pub mod user;

pub use post::{Author, NewPost, Post, PostWithAuthor};
pub use user::User;
