pub mod comparison;
pub mod results;
pub mod session;
pub mod ui_state;
pub mod views;
pub mod error;

pub use comparison::*;
pub use results::*;
pub use session::*;
pub use ui_state::*;
pub use views::*;
pub use error::*;
