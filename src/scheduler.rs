//! Fixed-period task runner with shutdown and per-tick panic isolation.

use crate::error::Result;
use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// A unit of periodic work. Errors and panics from `tick` are logged and the
/// task keeps running on its next period.
#[async_trait]
pub trait PeriodicTask: Send {
    fn name(&self) -> &'static str;
    async fn tick(&mut self) -> Result<()>;
}

/// When the first tick fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstTick {
    Immediate,
    AfterPeriod,
}

pub fn spawn_periodic<T>(
    task: T,
    period: Duration,
    first: FirstTick,
    shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    T: PeriodicTask + 'static,
{
    tokio::spawn(run_periodic(task, period, first, shutdown_rx))
}

pub async fn run_periodic<T>(
    mut task: T,
    period: Duration,
    first: FirstTick,
    mut shutdown_rx: watch::Receiver<bool>,
) where
    T: PeriodicTask,
{
    let start = match first {
        FirstTick::Immediate => Instant::now(),
        FirstTick::AfterPeriod => Instant::now() + period,
    };
    let mut ticker = interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(task = task.name(), period_ms = period.as_millis() as u64, "periodic task started");

    loop {
        if *shutdown_rx.borrow() {
            break;
        }
        tokio::select! {
            _ = ticker.tick() => {
                let result = AssertUnwindSafe(task.tick()).catch_unwind().await;
                match result {
                    Ok(Ok(())) => debug!(task = task.name(), "tick complete"),
                    Ok(Err(e)) => warn!(task = task.name(), error = %e, "tick failed"),
                    Err(panic) => error!(
                        task = task.name(),
                        panic = %panic_message(panic.as_ref()),
                        "tick panicked, continuing"
                    ),
                }
            }
            changed = shutdown_rx.changed() => {
                // a dropped sender also means shutdown
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }

    info!(task = task.name(), "periodic task stopped");
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
