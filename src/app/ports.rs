use crate::error::Result;
use crate::types::{LogEvent, MetricSample};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Queries the centralized log search for recent events of a system.
#[async_trait]
pub trait LogSearchPort: Send + Sync {
    async fn search(&self, system_id: &str) -> Result<Vec<LogEvent>>;
}

/// Destination for delivery measurements.
#[async_trait]
pub trait MetricSinkPort: Send + Sync {
    async fn write(&self, sample: &MetricSample) -> Result<()>;
}

/// Outbound GET used to provoke access-log lines.
#[async_trait]
pub trait HttpClientPort: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpGetResult>;
}

#[derive(Clone, Debug)]
pub struct HttpGetResult {
    pub status: u16,
}

impl HttpGetResult {
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// Writes an application log line carrying a marker id.
pub trait AppLogPort: Send + Sync {
    fn write_marker(&self, id: &str, emitted_at: DateTime<Utc>) -> Result<()>;
}
