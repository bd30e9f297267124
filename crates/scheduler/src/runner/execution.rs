use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::error::SchedulerError;
use crate::metrics::SchedulerMetrics;
use crate::state::SharedSchedulerState;

use super::operations::apply_tick;
use super::Scheduler;

/// A running clock task and the signal that stops it.
pub(crate) struct ClockHandle {
    shutdown: Arc<Notify>,
    task: JoinHandle<()>,
}

impl ClockHandle {
    /// Ask the clock to stop before its next tick.
    pub(super) fn signal(&self) {
        // notify_one stores a permit, so a tick in progress cannot miss it.
        self.shutdown.notify_one();
    }
}

impl Scheduler {
    /// Start the clock actor on the current tokio runtime. One tick fires
    /// every `tick_period`, the first one a full period from now.
    pub fn start_clock(&self) -> Result<(), SchedulerError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| SchedulerError::NoRuntime)?;

        let mut clock = self
            .clock
            .lock()
            .map_err(|e| SchedulerError::LockPoisoned(format!("clock lock: {}", e)))?;
        if clock.is_some() {
            return Err(SchedulerError::ClockRunning);
        }

        let period = self.config.tick_period();
        let shutdown = Arc::new(Notify::new());
        let task = runtime.spawn(run_clock(
            Arc::clone(&self.state),
            Arc::clone(&self.metrics),
            period,
            Arc::clone(&shutdown),
        ));
        *clock = Some(ClockHandle { shutdown, task });

        info!("Scheduler clock started (period {:?})", period);
        Ok(())
    }

    pub fn is_clock_running(&self) -> bool {
        self.clock.lock().map(|c| c.is_some()).unwrap_or(false)
    }

    /// Stop the clock actor and wait for it to exit. No tick is applied after
    /// this returns; the state stays queryable. Calling it again is a no-op.
    pub async fn shutdown(&self) -> Result<(), SchedulerError> {
        let handle = {
            let mut clock = self
                .clock
                .lock()
                .map_err(|e| SchedulerError::LockPoisoned(format!("clock lock: {}", e)))?;
            clock.take()
        };
        let Some(handle) = handle else {
            return Ok(());
        };

        info!("Scheduler shutdown requested");
        handle.signal();
        if let Err(e) = handle.task.await {
            warn!(error = %e, "clock task ended abnormally");
        }
        info!("Scheduler clock stopped");
        Ok(())
    }
}

async fn run_clock(
    state: SharedSchedulerState,
    metrics: Arc<RwLock<SchedulerMetrics>>,
    period: Duration,
    shutdown: Arc<Notify>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Skip the immediate first tick
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;
            _ = shutdown.notified() => break,
            _ = ticker.tick() => {
                match apply_tick(&state, &metrics) {
                    Ok(report) => {
                        if !report.finished.is_empty() || !report.dispatch.placed.is_empty() {
                            debug!(
                                tick = report.tick,
                                finished = report.finished.len(),
                                dispatched = report.dispatch.placed.len(),
                                "clock tick"
                            );
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "clock tick failed, stopping clock");
                        break;
                    }
                }
            }
        }
    }
}
