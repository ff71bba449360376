mod container;
mod control;
mod core;
mod focus;
mod scroll_container;
mod tree;

pub use self::core::*;
pub use container::*;
pub use focus::*;
pub use scroll_container::*;
pub use tree::*;
