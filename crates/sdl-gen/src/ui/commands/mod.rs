pub mod generate;
pub mod list;

pub use generate::{generate_definitions, resolve_config};
pub use list::list_types;
