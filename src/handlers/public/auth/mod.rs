// handlers/public/auth/mod.rs - Public authentication handlers
//
// Account creation and token acquisition.

use serde::Deserialize;

pub mod login;    // POST /login - authenticate and get JWT
pub mod register; // POST /register - create new account

pub use login::login_post;
pub use register::register_post;

/// Body shared by register and login. Fields are optional so that a missing
/// value is reported as a 400 by the service rather than a body rejection.
#[derive(Debug, Default, Deserialize)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    /// The handle exactly as sent; surrounding whitespace fails validation
    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or_default()
    }

    pub fn password(&self) -> &str {
        self.password.as_deref().unwrap_or_default()
    }
}
