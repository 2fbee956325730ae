pub mod auth_service;
pub mod post_service;
pub mod upload_service;

pub use auth_service::{AuthError, AuthService, LoginOutcome};
pub use post_service::{PostError, PostInput, PostService};
pub use upload_service::{UploadError, UploadService, UploadedFile};
