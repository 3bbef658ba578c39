//! Generic polling loop trait and runner.

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::emit;
use crate::metrics::events::PollIteration;

/// Result of a single poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The awaited condition does not hold yet.
    Pending,
    /// The awaited condition holds, carrying the final observation.
    Ready(T),
}

/// Trait for something that can be polled until it is ready.
#[async_trait]
pub trait PollingProcessor {
    /// The value produced once ready.
    type Output: Send;
    /// The error type for this processor.
    type Error: std::error::Error + Send;

    /// Observe the remote state once.
    async fn poll(&mut self) -> Result<PollOutcome<Self::Output>, Self::Error>;
}

/// Run a polling loop with the given processor.
///
/// Calls `poll()` until it reports `Ready`, sleeping `poll_interval` between
/// attempts. Errors abort the loop immediately. There is no upper bound on
/// the number of attempts.
///
/// The `name` parameter identifies the polled resource in log messages and
/// metrics.
pub async fn run_polling_loop<P: PollingProcessor + Send>(
    processor: &mut P,
    poll_interval: Duration,
    name: &str,
) -> Result<P::Output, P::Error> {
    let started = Instant::now();
    let mut attempt: u64 = 0;

    loop {
        attempt += 1;
        match processor.poll().await? {
            PollOutcome::Ready(output) => {
                emit!(PollIteration {
                    target: name.to_string(),
                    ready: true,
                });
                debug!(
                    target = name,
                    attempt,
                    elapsed_ms = started.elapsed().as_millis(),
                    "Polling finished"
                );
                return Ok(output);
            }
            PollOutcome::Pending => {
                emit!(PollIteration {
                    target: name.to_string(),
                    ready: false,
                });
                debug!(
                    target = name,
                    attempt,
                    "Not ready, waiting {}ms before next poll",
                    poll_interval.as_millis()
                );
                tokio::time::sleep(poll_interval).await;
            }
        }
    }
}

/// Wait for a remote change to settle before observing it again.
pub async fn settle(delay: Duration, subject: &str) {
    info!("Waiting {}ms for {subject} to settle", delay.as_millis());
    tokio::time::sleep(delay).await;
}
