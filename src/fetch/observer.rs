use std::time::Duration;

use tracing::{debug, error, warn};

use super::Failure;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    TransientFailure,
    Exhausted,
    /// Non-retriable failure; the call ends here.
    Fatal,
}

/// One attempt inside a single `fetch` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryAttempt {
    /// 0-based.
    pub attempt_index: u32,
    /// Backoff slept before this attempt started.
    pub elapsed_backoff: Duration,
    pub outcome: AttemptOutcome,
}

/// Receives attempt-level events from the fetcher.
///
/// Every hook has a no-op default so implementations only pick what they need.
pub trait RetryObserver: Send + Sync {
    fn on_success(&self, _url: &str, _attempt: &RetryAttempt) {}

    /// Called after a transient failure, before sleeping `delay`.
    fn on_retry(&self, _url: &str, _attempt: &RetryAttempt, _delay: Duration, _failure: &Failure) {}

    fn on_exhausted(&self, _url: &str, _attempt: &RetryAttempt, _failure: &Failure) {}

    fn on_fatal(&self, _url: &str, _attempt: &RetryAttempt, _failure: &Failure) {}

    /// A server hint was too large to honour.
    fn on_hint_ignored(&self, _url: &str, _hint: Duration) {}
}

/// Emits one structured `tracing` event per hook.
#[derive(Debug, Clone, Default)]
pub struct TracingObserver;

impl RetryObserver for TracingObserver {
    fn on_success(&self, url: &str, attempt: &RetryAttempt) {
        debug!(url, attempt = attempt.attempt_index + 1, "fetch succeeded");
    }

    fn on_retry(&self, url: &str, attempt: &RetryAttempt, delay: Duration, failure: &Failure) {
        warn!(
            url,
            attempt = attempt.attempt_index + 1,
            delay_secs = delay.as_secs_f64(),
            error = %failure,
            "fetch failed, retrying"
        );
    }

    fn on_exhausted(&self, url: &str, attempt: &RetryAttempt, failure: &Failure) {
        error!(
            url,
            attempts = attempt.attempt_index + 1,
            error = %failure,
            "fetch failed, retries exhausted"
        );
    }

    fn on_fatal(&self, url: &str, attempt: &RetryAttempt, failure: &Failure) {
        error!(
            url,
            attempt = attempt.attempt_index + 1,
            error = %failure,
            "fetch failed with non-retriable error"
        );
    }

    fn on_hint_ignored(&self, url: &str, hint: Duration) {
        warn!(
            url,
            retry_after_secs = hint.as_secs(),
            "retry-after hint is abnormally high, using computed backoff"
        );
    }
}
