use std::{sync::Arc, time::Duration};

use reqwest::StatusCode;
use tokio::select;

use super::{
    AttemptOutcome, CancellationToken, Classifier, FetchError, FetchRequest, FetchResult, Failure,
    ReqwestTransport, RetryAttempt, RetryObserver, RetryPolicy, Sleeper, TokioSleeper,
    TracingObserver, Transport, TransportError, default_classifier, parse_retry_after,
};

/// Longest slice of an error body kept for diagnostics.
const ERROR_BODY_LIMIT: usize = 512;

/// Issues GET requests and retries transient failures with exponential backoff.
///
/// Attempts run strictly one after another: the next attempt is only issued
/// once the previous one has failed and its backoff has elapsed. A call ends
/// with the first 2xx response, the first non-retriable failure, or
/// [`FetchError::ExhaustedRetries`] once `max_retries` attempts have failed.
pub struct RetryingFetcher<T = ReqwestTransport, S = TokioSleeper> {
    transport: T,
    sleeper: S,
    policy: RetryPolicy,
    classifier: Classifier,
    observer: Arc<dyn RetryObserver>,
    shutdown: CancellationToken,
}

impl RetryingFetcher {
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_parts(ReqwestTransport::default(), TokioSleeper, policy)
    }
}

impl<T: Transport, S: Sleeper> RetryingFetcher<T, S> {
    pub fn with_parts(transport: T, sleeper: S, policy: RetryPolicy) -> Self {
        Self {
            transport,
            sleeper,
            policy,
            classifier: default_classifier(),
            observer: Arc::new(TracingObserver),
            shutdown: CancellationToken::new(),
        }
    }

    /// Replaces the `is_retriable(status, transport_error)` predicate.
    pub fn with_classifier<F>(mut self, classifier: F) -> Self
    where
        F: Fn(Option<StatusCode>, Option<&TransportError>) -> bool + Send + Sync + 'static,
    {
        self.classifier = Arc::new(classifier);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn RetryObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Cancelling `shutdown` ends a running call with [`FetchError::Cancelled`]
    /// before its next attempt or in the middle of a backoff sleep.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub async fn fetch(&self, request: &FetchRequest) -> Result<FetchResult, FetchError> {
        self.fetch_with(request, &self.policy).await
    }

    /// Like [`fetch`](Self::fetch) with a one-off policy.
    pub async fn fetch_with(
        &self,
        request: &FetchRequest,
        policy: &RetryPolicy,
    ) -> Result<FetchResult, FetchError> {
        request.validate()?;
        policy.validate()?;

        let url = request.url.as_str();
        let mut elapsed_backoff = Duration::ZERO;
        let mut attempt_index = 0u32;

        loop {
            if self.shutdown.is_cancelled() {
                return Err(FetchError::Cancelled {
                    url: url.to_string(),
                    attempts: attempt_index,
                });
            }

            let mut attempt = RetryAttempt {
                attempt_index,
                elapsed_backoff,
                outcome: AttemptOutcome::Success,
            };

            let (failure, hint) = match self.transport.send(request).await {
                Ok(response) if response.status.is_success() => {
                    self.observer.on_success(url, &attempt);
                    return Ok(FetchResult::new(
                        response.status,
                        response.body,
                        request.expect,
                    ));
                }
                Ok(response) => {
                    let hint = parse_retry_after(&response.headers);
                    let failure = Failure::Status {
                        status: response.status,
                        body: error_body(&response.body),
                    };
                    (failure, hint)
                }
                Err(err) => (Failure::Transport(err), None),
            };

            if !(self.classifier)(failure.status(), failure.transport()) {
                attempt.outcome = AttemptOutcome::Fatal;
                self.observer.on_fatal(url, &attempt, &failure);
                return Err(FetchError::Fatal {
                    url: url.to_string(),
                    failure,
                });
            }

            if attempt_index + 1 >= policy.max_retries {
                attempt.outcome = AttemptOutcome::Exhausted;
                self.observer.on_exhausted(url, &attempt, &failure);
                return Err(FetchError::ExhaustedRetries {
                    url: url.to_string(),
                    attempts: attempt_index + 1,
                    last: failure,
                });
            }

            if let Some(hint) = hint {
                if hint > policy.retry_after_limit {
                    self.observer.on_hint_ignored(url, hint);
                }
            }
            let delay = policy.backoff(attempt_index, hint);

            attempt.outcome = AttemptOutcome::TransientFailure;
            self.observer.on_retry(url, &attempt, delay, &failure);

            select! {
                _ = self.sleeper.sleep(delay) => {}
                _ = self.shutdown.cancelled() => {
                    return Err(FetchError::Cancelled {
                        url: url.to_string(),
                        attempts: attempt_index + 1,
                    });
                }
            }

            elapsed_backoff += delay;
            attempt_index += 1;
        }
    }
}

fn error_body(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.into_owned(),
    }
}
