// handlers/public/auth/mod.rs - Token acquisition
pub mod login;

pub use login::login;
