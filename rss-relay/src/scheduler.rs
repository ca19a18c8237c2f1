use crate::pipeline::Pipeline;
use crate::types::{RelayError, Result, TickOutcome};
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_TICK_TIMEOUT: Duration = Duration::from_secs(120);

/// Drives a pipeline on a fixed interval, one bounded tick at a time.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    interval: Duration,
    tick_timeout: Duration,
}

impl Scheduler {
    pub fn new(interval: Duration, tick_timeout: Duration) -> Self {
        Self { interval, tick_timeout }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run a single tick, abandoning it once the deadline passes.
    pub async fn run_once(&self, pipeline: &Pipeline) -> Result<TickOutcome> {
        match tokio::time::timeout(self.tick_timeout, pipeline.run_tick()).await {
            Ok(result) => result,
            Err(_) => Err(RelayError::Timeout {
                seconds: self.tick_timeout.as_secs(),
            }),
        }
    }

    /// Tick immediately, then every interval, until Ctrl-C.
    pub async fn run(&self, pipeline: &Pipeline) -> usize {
        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        };
        self.run_until(pipeline, shutdown).await
    }

    /// Tick immediately, then every interval, until `shutdown` resolves.
    /// Returns the number of ticks started.
    pub async fn run_until<F>(&self, pipeline: &Pipeline, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        let mut timer = tokio::time::interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(
            "Relay is running for {} (every {}s). Press Ctrl+C to stop.",
            pipeline.feed().uri,
            self.interval.as_secs()
        );

        let mut ticks = 0;
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutting down after {} ticks", ticks);
                    return ticks;
                }
                _ = timer.tick() => {
                    ticks += 1;
                    match self.run_once(pipeline).await {
                        Ok(outcome) => info!("Tick {} finished: {:?}", ticks, outcome),
                        Err(e) => error!("Tick {} failed: {}", ticks, e),
                    }
                }
            }
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_TICK_TIMEOUT)
    }
}
