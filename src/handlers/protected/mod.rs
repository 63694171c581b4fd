// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Route Prefix: /api/*
// Reads need any valid token; mutations take the `AdminUser` extractor.
pub mod auth;
pub mod components;
pub mod menus;
mod utils;
