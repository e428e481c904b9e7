pub mod config;
pub mod json_error;
pub mod schema;
pub mod types;
