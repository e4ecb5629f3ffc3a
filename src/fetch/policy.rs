use std::{sync::Arc, time::Duration};

use reqwest::{StatusCode, header::HeaderMap};

use super::{FetchError, TransportError};

/// Decides whether a failed attempt is worth repeating.
///
/// Receives the response status when the server answered, or the transport
/// error when it did not. Exactly one of the two is `Some`.
pub type Classifier = Arc<dyn Fn(Option<StatusCode>, Option<&TransportError>) -> bool + Send + Sync>;

/// Network errors, timeouts, 429 and every 5xx are retried; everything else is fatal.
pub fn default_is_retriable(status: Option<StatusCode>, err: Option<&TransportError>) -> bool {
    match status {
        Some(status) => status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error(),
        None => err.is_some(),
    }
}

pub fn default_classifier() -> Classifier {
    Arc::new(default_is_retriable)
}

/// Bounded exponential backoff without jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts allowed, including the first one.
    pub max_retries: u32,
    pub base_delay: Duration,
    /// Ceiling for a single backoff. `None` lets the delay grow unbounded.
    pub max_delay: Option<Duration>,
    /// Server `Retry-After` hints above this are ignored.
    pub retry_after_limit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: None,
            retry_after_limit: Duration::from_secs(120),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            ..Self::default()
        }
    }

    pub fn with_max_delay(mut self, max_delay: Option<Duration>) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn validate(&self) -> Result<(), FetchError> {
        if self.max_retries == 0 {
            return Err(FetchError::InvalidRequest(
                "max_retries must be at least 1".into(),
            ));
        }
        if self.base_delay.is_zero() {
            return Err(FetchError::InvalidRequest(
                "base_delay must be greater than zero".into(),
            ));
        }
        // a ceiling under the first delay would flatten the whole schedule
        if let Some(cap) = self.max_delay {
            if cap < self.base_delay {
                return Err(FetchError::InvalidRequest(format!(
                    "max_delay ({:?}) must not be below base_delay ({:?})",
                    cap, self.base_delay
                )));
            }
        }
        Ok(())
    }

    /// `base_delay * 2^attempt_index`, capped by `max_delay` when set.
    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt_index).unwrap_or(u32::MAX);
        let raw = self.base_delay.saturating_mul(factor);
        match self.max_delay {
            Some(cap) => raw.min(cap),
            None => raw,
        }
    }

    /// Picks the delay after a failed attempt, letting a usable server hint win.
    pub(crate) fn backoff(&self, attempt_index: u32, hint: Option<Duration>) -> Duration {
        match hint {
            Some(hint) if !hint.is_zero() && hint <= self.retry_after_limit => match self.max_delay {
                Some(cap) => hint.min(cap),
                None => hint,
            },
            _ => self.delay_for(attempt_index),
        }
    }
}

/// Reads a `Retry-After` header given in whole seconds.
///
/// The HTTP-date form is not used by the APIs this crate talks to and is ignored.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
