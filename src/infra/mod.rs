pub mod column_client;
pub mod config;
pub mod utils;
