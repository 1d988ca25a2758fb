//! Wires configuration, ports and periodic tasks into a running probe.

use crate::app::emitter::{AppLogEmitter, HttpLogEmitter};
use crate::app::ports::{AppLogPort, HttpClientPort, LogSearchPort, MetricSinkPort};
use crate::app::recorder::MetricRecorder;
use crate::app::tracker::{PendingTracker, Thresholds};
use crate::app::watch::Watcher;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{MonitorError, Result};
use crate::infra::app_log::StdoutAppLog;
use crate::infra::http_client::{build_client, ReqwestHttp};
use crate::infra::log_search::PapertrailSearch;
use crate::infra::metric_store::{DryRunMetricSink, InfluxMetricSink};
use crate::scheduler::{spawn_periodic, FirstTick};
use crate::server;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};

/// The external collaborators a monitor talks to.
pub struct Ports {
    pub clock: Arc<dyn Clock>,
    pub app_log: Arc<dyn AppLogPort>,
    pub http: Arc<dyn HttpClientPort>,
    pub search: Arc<dyn LogSearchPort>,
    pub sink: Arc<dyn MetricSinkPort>,
}

impl Ports {
    /// Production adapters built from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = build_client(config.request_timeout)?;
        let sink: Arc<dyn MetricSinkPort> = match (&config.metrics_store_url, config.dry_run) {
            (_, true) => Arc::new(DryRunMetricSink),
            (Some(url), false) => Arc::new(InfluxMetricSink::new(client.clone(), url.clone())),
            (None, false) => {
                return Err(MonitorError::Config("metric store URL is required outside dry-run".into()))
            }
        };
        Ok(Self {
            clock: Arc::new(SystemClock),
            app_log: Arc::new(StdoutAppLog),
            http: Arc::new(ReqwestHttp::new(client.clone())),
            search: Arc::new(PapertrailSearch::new(
                client,
                config.search_url.clone(),
                config.search_token.clone(),
            )),
            sink,
        })
    }
}

/// Periodic tasks and the intervals they run at.
pub struct Monitor {
    config: Config,
    app_emitter: AppLogEmitter,
    http_emitter: HttpLogEmitter,
    watcher: Watcher,
}

impl Monitor {
    pub fn new(config: Config, ports: Ports) -> Self {
        let (tracker, registry) = PendingTracker::new();
        let thresholds = Thresholds {
            timeout_on_search_secs: config.timeout_on_search_secs,
            time_to_failure_secs: config.time_to_failure_secs,
        };
        let recorder = MetricRecorder::new(config.system_name.clone(), ports.sink);

        let app_emitter = AppLogEmitter::new(ports.clock.clone(), ports.app_log, registry.clone());
        let http_emitter = HttpLogEmitter::new(
            ports.clock.clone(),
            ports.http,
            config.monitored_url.clone(),
            registry,
        );
        let watcher = Watcher::new(
            tracker,
            ports.search,
            recorder,
            ports.clock,
            thresholds,
            config.dry_run,
        );

        Self {
            config,
            app_emitter,
            http_emitter,
            watcher,
        }
    }

    /// Run every task until `shutdown` resolves, then stop them all.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let Monitor {
            config,
            app_emitter,
            http_emitter,
            watcher,
        } = self;
        info!(system = %config.system_name, dry_run = config.dry_run, "System: {}", config.system_name);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let responder = {
            let mut rx = shutdown_rx.clone();
            let port = config.port;
            let log_requests = config.dry_run;
            tokio::spawn(async move {
                let signal = async move {
                    while !*rx.borrow() {
                        if rx.changed().await.is_err() {
                            break;
                        }
                    }
                };
                if let Err(e) = server::start_responder(port, log_requests, signal).await {
                    error!(error = %e, "sample responder failed");
                }
            })
        };

        let tasks = vec![
            spawn_periodic(http_emitter, config.http_log_interval, FirstTick::Immediate, shutdown_rx.clone()),
            spawn_periodic(app_emitter, config.app_log_interval, FirstTick::Immediate, shutdown_rx.clone()),
            spawn_periodic(watcher, config.watch_interval, FirstTick::AfterPeriod, shutdown_rx),
        ];

        shutdown.await;
        info!("Shutdown requested");
        let _ = shutdown_tx.send(true);

        for task in tasks {
            if let Err(e) = task.await {
                error!(error = %e, "periodic task ended abnormally");
            }
        }
        // the responder drains in-flight requests; don't wait forever on it
        if tokio::time::timeout(Duration::from_secs(5), responder).await.is_err() {
            error!("sample responder did not stop in time");
        }

        info!("Monitor stopped");
        Ok(())
    }
}
