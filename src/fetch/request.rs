use std::{collections::BTreeMap, time::Duration};

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::FetchError;

/// What a successful body is expected to look like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentKind {
    /// Body must parse as JSON for the result to count as succeeded.
    #[default]
    Json,
    /// Any body is accepted, including an empty one.
    Bytes,
}

/// A fully-constructed GET request.
///
/// Headers and query parameters are kept in ordered maps so two requests built
/// from the same inputs compare equal and hit the wire in the same order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
    pub timeout: Duration,
    pub expect: ContentKind,
}

impl FetchRequest {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
            query: BTreeMap::new(),
            timeout: Self::DEFAULT_TIMEOUT,
            expect: ContentKind::Json,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {}", token))
    }

    pub fn query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.insert(name.into(), value.to_string());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn expect(mut self, expect: ContentKind) -> Self {
        self.expect = expect;
        self
    }

    /// Same headers and timeout, pointed at a different absolute URL.
    ///
    /// Paging objects hand back a `next` URL that already carries the full
    /// query string, so the first request's parameters are dropped.
    pub fn follow(&self, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: self.headers.clone(),
            query: BTreeMap::new(),
            timeout: self.timeout,
            expect: self.expect,
        }
    }

    pub fn validate(&self) -> Result<(), FetchError> {
        if self.url.trim().is_empty() {
            return Err(FetchError::InvalidRequest("url must not be empty".into()));
        }
        if self.timeout.is_zero() {
            return Err(FetchError::InvalidRequest(
                "timeout must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Outcome of the attempt that ended a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub succeeded: bool,
}

impl FetchResult {
    /// Builds a result, deciding `succeeded` from the status and the body shape.
    pub fn new(status: StatusCode, body: Vec<u8>, expect: ContentKind) -> Self {
        let body_ok = match expect {
            ContentKind::Bytes => true,
            ContentKind::Json => serde_json::from_slice::<serde_json::Value>(&body).is_ok(),
        };
        Self {
            succeeded: status.is_success() && body_ok,
            status,
            body,
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
