//! Component variants, the factory that builds them, and the request shapes
//! used to create or replace them.

pub mod error;
pub mod factory;
pub mod kind;
pub mod requests;

pub use error::ComponentError;
pub use factory::{build_component, rebuild_component, ComponentDraft, NewComponent};
pub use kind::{normalize_value, ComponentKind, ComponentType};
pub use requests::{CreateMenuComponentRequest, UpdateComponentRequest};
