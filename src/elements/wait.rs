//! Bounded polling
//!
//! A probe looks at the page once and says whether the condition holds, does
//! not hold yet, or hit a stale element. [`FluentWait`] repeats a probe until
//! it succeeds or the timeout passes; [`retry_on_stale`] restarts a whole wait
//! when it ends on a stale element.

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::Result;

/// Poll interval while resolving an element
pub const RESOLVE_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Poll interval for clickability and visibility checks
pub const STATE_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Budget for `does_not_exist`
pub const ABSENCE_TIMEOUT: Duration = Duration::from_millis(250);

/// Extra attempts after a stale element
pub const STALE_RETRIES: u32 = 5;

/// Result of looking once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    Found(T),
    NotFound,
    Stale,
}

/// Result of a whole wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome<T> {
    Found(T),
    TimedOut,
    Stale,
}

impl<T> WaitOutcome<T> {
    pub fn found(self) -> Option<T> {
        match self {
            WaitOutcome::Found(value) => Some(value),
            _ => None,
        }
    }
}

/// Repeats a probe at a fixed interval until a deadline
#[derive(Debug, Clone, Copy)]
pub struct FluentWait {
    timeout: Duration,
    interval: Duration,
}

impl FluentWait {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            interval: RESOLVE_POLL_INTERVAL,
        }
    }

    pub fn polling_every(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe until found, stale, or out of time
    ///
    /// The probe always runs at least once. An `Err` from the probe ends the
    /// wait immediately.
    pub async fn until<T, F, Fut>(self, mut probe: F) -> Result<WaitOutcome<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Probe<T>>>,
    {
        let deadline = Instant::now() + self.timeout;
        loop {
            match probe().await? {
                Probe::Found(value) => return Ok(WaitOutcome::Found(value)),
                Probe::Stale => return Ok(WaitOutcome::Stale),
                Probe::NotFound => {}
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(WaitOutcome::TimedOut);
            }
            sleep(self.interval.min(deadline - now)).await;
        }
    }
}

/// Run `attempt` again while it ends on a stale element, up to `retries` times
pub async fn retry_on_stale<T, F, Fut>(retries: u32, mut attempt: F) -> Result<WaitOutcome<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<WaitOutcome<T>>>,
{
    let mut stale = 0;
    loop {
        match attempt().await? {
            WaitOutcome::Stale if stale < retries => {
                stale += 1;
                debug!("Stale element, retry {} of {}", stale, retries);
            }
            outcome => return Ok(outcome),
        }
    }
}
