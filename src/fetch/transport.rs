use std::{future::Future, time::Duration};

use reqwest::{Client, StatusCode, header::HeaderMap};

use super::{FetchRequest, TransportError};

/// Whatever the server answered, before any classification.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

/// Issues one GET for a request. No retries happen at this level.
pub trait Transport {
    fn send(
        &self,
        request: &FetchRequest,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}

/// Suspends the caller between attempts.
pub trait Sleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

#[derive(Debug, Clone, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn send(
        &self,
        request: &FetchRequest,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send {
        let mut builder = self
            .client
            .get(&request.url)
            .timeout(request.timeout)
            .query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        async move {
            let response = builder.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await?.to_vec();
            Ok(RawResponse {
                status,
                headers,
                body,
            })
        }
    }
}
