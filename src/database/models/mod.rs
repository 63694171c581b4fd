pub mod component;
pub mod menu_entry;
pub mod user;

pub use component::Component;
pub use menu_entry::{MenuEntry, MenuEntryPatch, MenuItem, NewMenuEntry};
pub use user::User;
