pub mod handlers;
pub mod models;
pub mod services;
pub mod settings;
pub mod utils;
