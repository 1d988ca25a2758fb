// Observability: logging and process metrics

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
