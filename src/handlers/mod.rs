// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (JWT auth, admin role for mutations)
pub mod protected;
pub mod public;
