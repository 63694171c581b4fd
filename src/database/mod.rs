pub mod component_repository;
pub mod manager;
pub mod menu;
pub mod models;
pub mod user_repository;

pub use component_repository::{ComponentQuery, ComponentRepository};
pub use manager::{DatabaseError, DatabaseManager};
pub use menu::{KeyShape, MenuFilter, MenuRepository, MenuScope, ScopeKey};
pub use user_repository::{NewUser, UserRepository};
