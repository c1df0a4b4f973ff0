use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::probe::{ProbeOutcome, Prober};
use crate::types::PollResult;

/// Timing policy for one polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Base delay between probes.
    pub interval: Duration,
    /// Absolute wall-clock budget measured from loop start.
    pub timeout: Duration,
    /// Number of attempts that run at the base interval.
    pub step_up_after: u32,
    /// Multiplier applied to the interval after `step_up_after` attempts.
    pub step_up_factor: u32,
}

impl PollConfig {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval,
            timeout,
            step_up_after: 6,
            step_up_factor: 3,
        }
    }

    /// Delay scheduled before the given 1-based attempt: the base interval
    /// for the first `step_up_after` attempts, stepped up once afterwards.
    pub fn interval_before(&self, attempt: u32) -> Duration {
        if attempt <= self.step_up_after {
            self.interval
        } else {
            self.interval * self.step_up_factor
        }
    }
}

/// Observer notified once per issued probe.
pub trait AttemptSink: Send + Sync {
    fn attempted(&self, attempts: u32);
}

/// Sink for loops nobody needs to watch.
pub struct NullAttemptSink;

impl AttemptSink for NullAttemptSink {
    fn attempted(&self, _attempts: u32) {}
}

/// Drives a prober until a terminal state.
///
/// Returns `None` when the token is cancelled; in that case nothing may be
/// surfaced to callers, including a probe result that was already in flight
/// when cancellation happened. Timeout is wall-clock from loop start and is
/// checked after each pending probe, independent of how many attempts
/// actually ran.
pub async fn run_poll_loop(
    prober: &dyn Prober,
    config: PollConfig,
    token: &CancellationToken,
    sink: &dyn AttemptSink,
) -> Option<PollResult> {
    let started = Instant::now();
    let mut attempts: u32 = 0;

    loop {
        let delay = config.interval_before(attempts + 1);
        tokio::select! {
            _ = token.cancelled() => return None,
            _ = tokio::time::sleep(delay) => {}
        }

        attempts += 1;
        sink.attempted(attempts);

        let outcome = tokio::select! {
            _ = token.cancelled() => return None,
            outcome = prober.probe() => outcome,
        };

        match outcome {
            ProbeOutcome::Done(output) => return Some(PollResult::Completed(output)),
            ProbeOutcome::Failed(reason) => return Some(PollResult::Failed(reason)),
            ProbeOutcome::Pending => {
                if started.elapsed() >= config.timeout {
                    return Some(PollResult::TimedOut);
                }
            }
        }
    }
}
