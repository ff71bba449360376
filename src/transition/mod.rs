mod fade;
mod time_function;

pub use fade::*;
pub use time_function::*;
