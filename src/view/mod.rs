pub mod base_component;
pub mod components;
mod form;
mod form_manager;
pub mod layout;
pub mod render;
pub mod widget;

pub use base_component::*;
pub use components::*;
pub use form::*;
pub use form_manager::*;
pub use render::{DrawList, RenderTarget};
pub use widget::Widget;
