// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, post reads, and service status.

pub mod auth;
pub mod posts;
pub mod root;
