pub mod payload_formatter;
pub mod config_builder;
pub mod baseline_workflow;
pub mod result_renderer;
pub mod http_client;
pub mod comparison_runner;
pub mod session_service;

pub use payload_formatter::*;
pub use config_builder::*;
pub use baseline_workflow::*;
pub use result_renderer::*;
pub use http_client::*;
pub use comparison_runner::*;
pub use session_service::*;
