use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed response from log search: {body}")]
    MalformedSearchResponse { body: String },

    #[error("Metric store rejected write with status {status}: {body}")]
    MetricStore { status: u16, body: String },

    #[error("Pending marker intake closed")]
    IntakeClosed,
}

pub type Result<T> = std::result::Result<T, MonitorError>;
