pub mod app;
pub mod auth;
pub mod cli;
pub mod components;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;

pub use app::{router, AppState};
