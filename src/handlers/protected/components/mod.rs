pub mod collection;
pub mod record;

pub use collection::{create, keys, list};
pub use record::{delete, get, update};
