//! # Fetch Module
//!
//! Bounded-retry HTTP GET with exponential backoff. Every pipeline stage talks
//! to the outside world through [`RetryingFetcher`], so backoff and error
//! classification behave the same for artists, albums and songs.
//!
//! ## Retry schedule
//!
//! After a failed attempt `i` (0-based) the fetcher sleeps
//! `base_delay * 2^i` before trying again. With the default policy
//! (`max_retries = 3`, `base_delay = 1s`) an endpoint that keeps failing is hit
//! three times with sleeps of 1s and 2s in between, then the call fails with
//! [`FetchError::ExhaustedRetries`]. No sleep follows the last attempt.
//!
//! A `Retry-After` header on a failed response replaces the computed delay for
//! that single attempt, as long as it stays under
//! [`RetryPolicy::retry_after_limit`].
//!
//! ## Classification
//!
//! | Outcome                          | Handling                      |
//! |----------------------------------|-------------------------------|
//! | 2xx                              | returned as [`FetchResult`]   |
//! | timeout / connection error       | retried                       |
//! | 429, 5xx                         | retried                       |
//! | any other status                 | [`FetchError::Fatal`]         |
//!
//! The predicate can be swapped per fetcher with
//! [`RetryingFetcher::with_classifier`].
//!
//! A 2xx response whose body does not match the expected [`ContentKind`] is
//! still returned, flagged with `succeeded = false`. Body validation belongs to
//! the caller.
//!
//! ## Seams
//!
//! - [`Transport`] issues a single request ([`ReqwestTransport`] in production).
//! - [`Sleeper`] performs the backoff ([`TokioSleeper`] in production).
//! - [`RetryObserver`] receives attempt events ([`TracingObserver`] logs them).
//! - A [`CancellationToken`] aborts a running retry sequence with
//!   [`FetchError::Cancelled`].

mod error;
mod fetcher;
mod observer;
mod policy;
mod request;
mod transport;

pub use error::{Failure, FetchError, TransportError, TransportErrorKind};
pub use fetcher::RetryingFetcher;
pub use observer::{AttemptOutcome, RetryAttempt, RetryObserver, TracingObserver};
pub use policy::{Classifier, RetryPolicy, default_classifier, default_is_retriable, parse_retry_after};
pub use request::{ContentKind, FetchRequest, FetchResult};
pub use transport::{RawResponse, ReqwestTransport, Sleeper, TokioSleeper, Transport};

pub use tokio_util::sync::CancellationToken;
