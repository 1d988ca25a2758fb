use crate::app::ports::{AppLogPort, HttpClientPort};
use crate::app::tracker::MarkerRegistry;
use crate::clock::Clock;
use crate::constants::{MARKER_ID_MAX, SAMPLES_PATH};
use crate::error::Result;
use crate::observability::metrics;
use crate::scheduler::PeriodicTask;
use crate::types::{Channel, PendingMarker};
use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, warn};

/// Random marker id in `0..=100_000_000`. Collisions are possible.
pub fn generate_marker_id() -> String {
    rand::thread_rng().gen_range(0..=MARKER_ID_MAX).to_string()
}

/// Writes marker ids into the application log.
pub struct AppLogEmitter {
    clock: Arc<dyn Clock>,
    log: Arc<dyn AppLogPort>,
    registry: MarkerRegistry,
}

impl AppLogEmitter {
    pub fn new(clock: Arc<dyn Clock>, log: Arc<dyn AppLogPort>, registry: MarkerRegistry) -> Self {
        Self { clock, log, registry }
    }

    pub async fn emit_once(&self) -> Result<PendingMarker> {
        let id = generate_marker_id();
        let emitted_at = self.clock.now();
        self.log.write_marker(&id, emitted_at)?;

        let marker = PendingMarker::new(id, emitted_at);
        self.registry.register(Channel::App, marker.clone())?;
        metrics::markers::emitted(Channel::App);
        Ok(marker)
    }
}

#[async_trait]
impl PeriodicTask for AppLogEmitter {
    fn name(&self) -> &'static str {
        "app_log_emitter"
    }

    async fn tick(&mut self) -> Result<()> {
        self.emit_once().await.map(|_| ())
    }
}

/// Requests `<base>/samples/<id>` so the id lands in the access log.
pub struct HttpLogEmitter {
    clock: Arc<dyn Clock>,
    client: Arc<dyn HttpClientPort>,
    base_url: String,
    registry: MarkerRegistry,
}

impl HttpLogEmitter {
    pub fn new(
        clock: Arc<dyn Clock>,
        client: Arc<dyn HttpClientPort>,
        base_url: impl Into<String>,
        registry: MarkerRegistry,
    ) -> Self {
        Self {
            clock,
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            registry,
        }
    }

    pub async fn emit_once(&self) -> Result<PendingMarker> {
        let path = format!("{}/{}", SAMPLES_PATH, generate_marker_id());
        let emitted_at = self.clock.now();
        let url = format!("{}{}", self.base_url, path);

        debug!(%url, "requesting sample");
        let res = self.client.get(&url).await?;
        if !res.is_success() {
            warn!(status = res.status, %url, "sample request returned non-success status");
        }

        // the stored id keeps the path prefix so it matches the access-log line
        let marker = PendingMarker::new(path, emitted_at);
        self.registry.register(Channel::Http, marker.clone())?;
        metrics::markers::emitted(Channel::Http);
        Ok(marker)
    }
}

#[async_trait]
impl PeriodicTask for HttpLogEmitter {
    fn name(&self) -> &'static str {
        "http_log_emitter"
    }

    async fn tick(&mut self) -> Result<()> {
        self.emit_once().await.map(|_| ())
    }
}
