//! # Spotify Integration Module
//!
//! Thin endpoint layer over the Spotify Web API for the three calls the
//! pipeline makes. Every call goes through a shared [`RetryingFetcher`], so
//! rate limiting (429) and server hiccups (5xx) are retried with backoff,
//! while bad credentials (401) or unknown ids (404) fail right away.
//!
//! ```text
//! Pipeline stages (artists, albums, songs)
//!          ↓
//! SpotifyClient (endpoint descriptors, decoding, pagination)
//!          ↓
//! RetryingFetcher (bounded retry with backoff)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Endpoints
//!
//! - `GET /artists?ids=...` - [`SpotifyClient::several_artists`], up to 50 ids per call
//! - `GET /artists/{id}/albums` - [`SpotifyClient::artist_albums`], paginated
//! - `GET /albums/{id}/tracks` - [`SpotifyClient::album_tracks`], paginated
//!
//! ## Pagination
//!
//! List endpoints return a paging object with a `next` URL. The client keeps
//! requesting `next` (one retried fetch per page) until it is `null`, and gives
//! up with [`SpotifyError::TooManyPages`] if a listing never ends.

pub mod albums;
pub mod artists;
mod paging;

use std::time::Duration;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::fetch::{
    FetchError, FetchRequest, ReqwestTransport, RetryingFetcher, Sleeper, TokioSleeper, Transport,
};

/// Upper bound on pages followed for a single listing.
pub const DEFAULT_MAX_PAGES: usize = 200;

#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The body decoded but does not fit the request it answers.
    #[error("unexpected response from {url}: {reason}")]
    UnexpectedBody { url: String, reason: String },
    #[error("cannot decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("listing {url} did not end after {max_pages} pages")]
    TooManyPages { url: String, max_pages: usize },
}

impl SpotifyError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SpotifyError::Fetch(e) if e.is_cancelled())
    }
}

pub struct SpotifyClient<T = ReqwestTransport, S = TokioSleeper> {
    fetcher: RetryingFetcher<T, S>,
    base_url: String,
    token: String,
    timeout: Duration,
    max_pages: usize,
}

impl<T: Transport, S: Sleeper> SpotifyClient<T, S> {
    pub fn new(fetcher: RetryingFetcher<T, S>, base_url: &str, token: &str) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            timeout: FetchRequest::DEFAULT_TIMEOUT,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Request descriptor for `{base_url}{path}` with auth and timeout applied.
    pub fn request(&self, path: &str) -> FetchRequest {
        FetchRequest::get(format!("{}{}", self.base_url, path))
            .bearer(&self.token)
            .header("Accept", "application/json")
            .timeout(self.timeout)
    }

    async fn get_json<D: DeserializeOwned>(&self, request: &FetchRequest) -> Result<D, SpotifyError> {
        // the fetcher only hands back 2xx responses, so a body it flagged as
        // malformed fails here as a decode error
        let result = self.fetcher.fetch(request).await?;
        result.json().map_err(|source| SpotifyError::Decode {
            url: request.url.clone(),
            source,
        })
    }
}
