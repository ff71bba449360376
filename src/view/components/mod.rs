mod button;
mod caption;
mod checkbox;
mod label;

pub use button::*;
pub use caption::*;
pub use checkbox::*;
pub use label::*;
