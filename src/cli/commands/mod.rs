pub mod component;
pub mod menu;
pub mod migrate;
pub mod user;
