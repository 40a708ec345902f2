pub mod config;
pub mod context;
pub mod models;
pub mod store;
