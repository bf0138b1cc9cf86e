//! Retry policy for transient submission failures and the delay abstraction
//! the attempt loop sleeps through.

use std::time::Duration;

use async_trait::async_trait;
use shared::domain::ErrorKind;

pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Fixed-delay retry policy. No backoff, no jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Failures where the endpoint never answered are not retried.
    pub fn is_retryable(kind: ErrorKind) -> bool {
        match kind {
            ErrorKind::ServerFailure | ErrorKind::ProtocolFailure => true,
            ErrorKind::ConnectivityFailure
            | ErrorKind::TimeoutFailure
            | ErrorKind::LocalFileFailure => false,
        }
    }

    /// `attempts_made` counts the attempts already finished, starting at 1.
    pub fn should_retry(&self, kind: ErrorKind, attempts_made: u32) -> bool {
        Self::is_retryable(kind) && attempts_made <= self.max_retries
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
