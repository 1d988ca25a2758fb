use crate::app::ports::MetricSinkPort;
use crate::constants::{METRIC_STORE_DB, METRIC_WRITE_THROTTLE_MS};
use crate::error::{MonitorError, Result};
use crate::types::MetricSample;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// Writes samples to an InfluxDB-compatible `/write` endpoint.
pub struct InfluxMetricSink {
    client: reqwest::Client,
    base_url: String,
    throttle: Duration,
}

impl InfluxMetricSink {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            throttle: Duration::from_millis(METRIC_WRITE_THROTTLE_MS),
        }
    }

    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn write_url(&self, system: &str) -> String {
        format!("{}/write?db={}&_http_tag={}", self.base_url, METRIC_STORE_DB, system)
    }
}

#[async_trait]
impl MetricSinkPort for InfluxMetricSink {
    async fn write(&self, sample: &MetricSample) -> Result<()> {
        let body = sample.line_protocol();
        debug!(%body, "writing measurement");
        let resp = self
            .client
            .post(self.write_url(&sample.system))
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        let outcome = if status.is_success() {
            Ok(())
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(MonitorError::MetricStore { status: status.as_u16(), body })
        };

        tokio::time::sleep(self.throttle).await;
        outcome
    }
}

/// Logs samples instead of writing them anywhere.
#[derive(Debug, Default)]
pub struct DryRunMetricSink;

impl DryRunMetricSink {
    pub fn format(sample: &MetricSample) -> String {
        format!(
            "=> write {} successful={} host={} drift={}",
            sample.channel.label(),
            sample.successful,
            sample.system,
            sample.drift_secs
        )
    }
}

#[async_trait]
impl MetricSinkPort for DryRunMetricSink {
    async fn write(&self, sample: &MetricSample) -> Result<()> {
        info!("{}", Self::format(sample));
        Ok(())
    }
}
