//! Readiness polling against the server's HTTP address.

mod http_target;
mod probe_result;
mod probe_target;

pub use http_target::HttpProbeTarget;
pub use probe_result::ProbeResult;
pub use probe_target::ProbeTarget;

use crate::{CancelGuard, ProbeErrorResult};

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::StreamExt;
use futures::stream::{self, BoxStream};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info};

/// Attempts in order; ends after the first `Ready` or on cancellation.
pub type ProbeStream = BoxStream<'static, ProbeResult>;

pub struct ReadinessProbe;

impl ReadinessProbe {
    /// Poll `url` every `interval`, each attempt bounded by `timeout`.
    ///
    /// The first attempt happens one interval after the call.
    pub fn start(
        url: &str,
        interval: Duration,
        timeout: Duration,
        cancel: CancelGuard,
    ) -> ProbeErrorResult<ProbeStream> {
        let target = HttpProbeTarget::new(url, timeout)?;
        Ok(Self::with_target(Arc::new(target), interval, cancel))
    }

    /// Poll an arbitrary target.
    pub fn with_target(
        target: Arc<dyn ProbeTarget>,
        interval: Duration,
        cancel: CancelGuard,
    ) -> ProbeStream {
        // tokio intervals reject a zero period
        let interval = interval.max(Duration::from_millis(1));
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Probing {} every {}ms",
            target.describe(),
            interval.as_millis()
        );

        let state = ProbeLoop {
            target,
            ticker,
            cancel,
            attempt: 0,
            finished: false,
        };

        stream::unfold(state, |mut state| async move {
            let result = state.next_attempt().await?;
            Some((result, state))
        })
        .boxed()
    }
}

struct ProbeLoop {
    target: Arc<dyn ProbeTarget>,
    ticker: Interval,
    cancel: CancelGuard,
    attempt: u32,
    finished: bool,
}

impl ProbeLoop {
    async fn next_attempt(&mut self) -> Option<ProbeResult> {
        if self.finished || self.cancel.is_cancelled() {
            return None;
        }

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                debug!("Probe cancelled after {} attempts", self.attempt);
                return None;
            }
            _ = self.ticker.tick() => {}
        }

        // Cancellation is only honoured between attempts.
        self.attempt += 1;
        let started = Instant::now();
        let result = match self.target.attempt().await {
            Ok(()) => {
                self.finished = true;
                let latency_ms = started.elapsed().as_millis() as u64;
                info!(
                    "{} ready after {} attempts ({latency_ms}ms)",
                    self.target.describe(),
                    self.attempt
                );
                ProbeResult::Ready {
                    attempt: self.attempt,
                    latency_ms,
                }
            }
            Err(reason) => {
                debug!("Probe attempt {} not ready: {reason}", self.attempt);
                ProbeResult::NotYetReady {
                    attempt: self.attempt,
                    reason,
                }
            }
        };

        Some(result)
    }
}
