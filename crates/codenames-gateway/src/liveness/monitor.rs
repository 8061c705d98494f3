//! Per-connection liveness probing
//!
//! Every `interval` the monitor pings the peer and waits up to `timeout` for
//! the matching pong. The first failed probe runs the failure callback and
//! ends the monitor; cancellation ends it silently.

use crate::connection::{Connection, ConnectionError};
use async_trait::async_trait;
use codenames_common::LivenessConfig;
use std::future::Future;
use std::time::Duration;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Default time between probes
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(30);

/// Default time to wait for a probe's answer
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Something that can be checked for liveness
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    /// Resolve once the peer has answered one probe
    async fn probe(&self) -> Result<(), ConnectionError>;

    /// Called after each successful probe
    fn record_alive(&self);
}

#[async_trait]
impl LivenessProbe for Connection {
    async fn probe(&self) -> Result<(), ConnectionError> {
        let seq = self.ping()?;
        self.wait_for_pong(seq).await
    }

    fn record_alive(&self) {
        self.touch();
    }
}

/// How a monitor run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessOutcome {
    /// The connection's token was cancelled
    Cancelled,
    /// A probe failed or timed out; the failure callback ran
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LivenessMonitor {
    interval: Duration,
    timeout: Duration,
}

impl Default for LivenessMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_INTERVAL, DEFAULT_PROBE_TIMEOUT)
    }
}

impl From<&LivenessConfig> for LivenessMonitor {
    fn from(config: &LivenessConfig) -> Self {
        Self::new(config.interval(), config.timeout())
    }
}

impl LivenessMonitor {
    #[must_use]
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe until cancelled or until a probe fails.
    ///
    /// `on_failure` runs at most once, and never after cancellation.
    pub async fn run<P, F, Fut>(
        &self,
        probe: &P,
        cancel: &CancellationToken,
        on_failure: F,
    ) -> LivenessOutcome
    where
        P: LivenessProbe + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ()>,
    {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return LivenessOutcome::Cancelled,
                _ = ticker.tick() => {}
            }

            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => return LivenessOutcome::Cancelled,
                result = timeout(self.timeout, probe.probe()) => result,
            };

            match result {
                Ok(Ok(())) => {
                    probe.record_alive();
                    tracing::trace!("Liveness probe answered");
                }
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "Liveness probe failed");
                    on_failure().await;
                    return LivenessOutcome::Failed;
                }
                Err(_) => {
                    tracing::warn!(
                        timeout_ms = self.timeout.as_millis(),
                        "Liveness probe timed out"
                    );
                    on_failure().await;
                    return LivenessOutcome::Failed;
                }
            }
        }
    }
}
