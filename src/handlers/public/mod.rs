// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition plus liveness endpoints. No /api prefix.
pub mod auth;
pub mod status;

pub use status::{health, root};
