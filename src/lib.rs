//! Retained-mode UI core: a control tree with auto-sizing layout, scrolling
//! containers, keyboard focus and pointer routing, driven one frame at a time
//! by a host that owns the window, the renderer and the clock.

pub mod config;
pub mod error;
pub mod geometry;
pub mod serialize;
pub mod style;
pub mod transition;
pub mod ui;
pub mod view;

pub use config::{ScrollConfig, UiConfig};
pub use error::{Result, UiError};
pub use geometry::{Alignment, AutoSize, EdgeInsets, Rect, SizeModes};
pub use view::{ControlId, ControlTree, Form, FormId, FormManager};
