// handlers/mod.rs - two security tiers
//
// Public (no auth) → Protected (bearer token required)
pub mod public;
pub mod protected;
