//! Upstream fetch.
//!
//! # Responsibilities
//! - Issue the single GET to the derived upstream URL
//! - Follow redirects transparently
//! - Hand the status and an unread body stream back to the reflector
//!
//! # Design Decisions
//! - `Upstream` is a trait so the reflector can be driven by an in-memory
//!   origin in tests
//! - The body is pulled chunk by chunk; nothing buffers the whole document
//! - No retries: a transport failure is returned to the caller as is

use std::future::Future;
use std::time::Duration;

use axum::http::StatusCode;
use bytes::Bytes;
use reqwest::redirect::Policy;

use crate::config::UpstreamConfig;
use crate::reflector::types::{ReflectError, ReflectResult};

/// A response whose body has not been read yet.
#[derive(Debug)]
pub struct UpstreamResponse<B> {
    pub status: StatusCode,
    pub body: B,
}

/// A body stream consumed exactly once.
pub trait UpstreamBody: Send {
    /// Next chunk of the body, or `None` once it is exhausted.
    fn next_chunk(&mut self) -> impl Future<Output = ReflectResult<Option<Bytes>>> + Send;
}

/// Something that can fetch an upstream page.
pub trait Upstream: Send + Sync {
    type Body: UpstreamBody;

    /// GET `url`, following redirects.
    fn fetch(
        &self,
        url: &str,
    ) -> impl Future<Output = ReflectResult<UpstreamResponse<Self::Body>>> + Send;
}

/// Production upstream backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
}

impl HttpUpstream {
    /// Build the client from configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .redirect(Policy::limited(config.max_redirects))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

impl Upstream for HttpUpstream {
    type Body = reqwest::Response;

    async fn fetch(&self, url: &str) -> ReflectResult<UpstreamResponse<reqwest::Response>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ReflectError::Upstream {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if response.url().as_str() != url {
            tracing::debug!(requested = %url, resolved = %response.url(), "Upstream redirected");
        }

        Ok(UpstreamResponse {
            status: response.status(),
            body: response,
        })
    }
}

impl UpstreamBody for reqwest::Response {
    async fn next_chunk(&mut self) -> ReflectResult<Option<Bytes>> {
        self.chunk()
            .await
            .map_err(|e| ReflectError::Body(e.to_string()))
    }
}
