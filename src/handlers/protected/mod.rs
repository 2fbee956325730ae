// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every handler here takes an `AuthUser` extractor, which rejects requests
// without a valid token before the body is read.

mod form;
pub mod posts;
pub mod profile;
