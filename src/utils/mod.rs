pub mod html;
pub mod validation;

pub use html::*;
pub use validation::*;
