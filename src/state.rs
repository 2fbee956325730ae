use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::BlogStore;
use crate::services::{AuthService, PostService, UploadService};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn BlogStore>,
    pub auth: AuthService,
    pub posts: PostService,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn BlogStore>) -> Self {
        let uploads = UploadService::new(config.api.uploads_dir.clone());
        let auth = AuthService::new(store.clone(), config.security.clone());
        let posts = PostService::new(store.clone(), uploads);

        Self {
            config: Arc::new(config),
            store,
            auth,
            posts,
        }
    }
}
