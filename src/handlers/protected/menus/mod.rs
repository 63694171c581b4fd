pub mod item;
pub mod menu;

pub use item::{create_item, delete_item, get_item, set_visibility, update_item};
pub use menu::{bind, clear, list, reorder};
