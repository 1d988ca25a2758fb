pub mod app;
pub mod clock;
pub mod config;
pub mod constants;
pub mod drain;
pub mod error;
pub mod infra;
pub mod monitor;
pub mod observability;
pub mod scheduler;
pub mod server;
pub mod types;
