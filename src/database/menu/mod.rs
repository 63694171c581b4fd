mod repository;
mod scope;

pub use repository::{MenuFilter, MenuRepository};
pub use scope::{KeyShape, MenuScope, ScopeKey};
