pub mod auth;
pub mod config;
pub mod context;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod store;
pub mod templates_structs;
pub mod warnings;
