mod color;
mod font;
mod theme;

pub use color::*;
pub use font::*;
pub use theme::*;
