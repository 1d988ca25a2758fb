use crate::app::ports::MetricSinkPort;
use crate::error::Result;
use crate::observability::metrics;
use crate::types::{Channel, MetricSample};
use std::sync::Arc;

/// Turns resolved markers into samples and hands them to the configured sink.
#[derive(Clone)]
pub struct MetricRecorder {
    system: String,
    sink: Arc<dyn MetricSinkPort>,
}

impl MetricRecorder {
    pub fn new(system: impl Into<String>, sink: Arc<dyn MetricSinkPort>) -> Self {
        Self {
            system: system.into(),
            sink,
        }
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    /// Record one measurement. Negative drift is clamped to zero.
    pub async fn record(&self, channel: Channel, successful: bool, drift_secs: f64) -> Result<()> {
        let sample = MetricSample::new(self.system.clone(), channel, successful, drift_secs);
        metrics::markers::resolved(channel, successful, sample.drift_secs);

        let written = self.sink.write(&sample).await;
        if written.is_err() {
            metrics::store::write_error();
        }
        written
    }
}
