use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::auth::{self, Claims, JwtError};
use crate::config::SecurityConfig;
use crate::database::models::User;
use crate::database::{BlogStore, DatabaseError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username and password are required.")]
    MissingCredentials,
    #[error("{0}")]
    InvalidUsername(String),
    #[error("User not found")]
    UserNotFound,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error(transparent)]
    Token(JwtError),
    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
}

/// Registration, login and token verification
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn BlogStore>,
    security: SecurityConfig,
}

impl AuthService {
    pub fn new(store: Arc<dyn BlogStore>, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<User, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        auth::validate_username_format(username).map_err(AuthError::InvalidUsername)?;

        let cost = self.security.bcrypt_cost;
        let password = password.to_string();
        let hash = tokio::task::spawn_blocking(move || auth::hash_password(&password, cost)).await??;

        let user = self.store.create_user(username, &hash).await?;
        info!("Registered user '{}' ({})", user.username, user.id);
        Ok(user)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let user = self
            .store
            .find_user_by_username(username)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let password = password.to_string();
        let hash = user.password.clone();
        let matches = tokio::task::spawn_blocking(move || auth::verify_password(&password, &hash)).await??;
        if !matches {
            warn!("Failed login attempt for user '{}'", username);
            return Err(AuthError::InvalidCredentials);
        }

        let claims = Claims::new(user.username.clone(), user.id, self.security.jwt_expiry_hours)
            .map_err(AuthError::Token)?;
        let token = auth::generate_jwt(&claims, &self.security).map_err(AuthError::Token)?;

        info!("User '{}' logged in", user.username);
        Ok(LoginOutcome { token, user })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        auth::validate_jwt(token, &self.security).map_err(|e| match e {
            JwtError::InvalidToken(msg) => {
                warn!("Rejected bearer token: {}", msg);
                AuthError::InvalidToken
            }
            other => AuthError::Token(other),
        })
    }
}
