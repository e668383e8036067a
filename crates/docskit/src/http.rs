//! Fetch capability consumed by the pipeline
//!
//! Design: the resolver and searcher never talk to the network directly.
//! They receive a [`TextFetcher`] and a [`UserAgentSource`], so tests can
//! inject in-memory doubles and callers can swap in their own transport.
//! [`HttpFetcher`] is the default reqwest-backed implementation.

use crate::error::DocsError;
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::header::{HeaderValue, ACCEPT, USER_AGENT};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, error, warn};

/// Accept header for documentation pages
pub const ACCEPT_HTML: &str = "text/html, application/xhtml+xml, */*;q=0.8";

/// Accept header for search index files
pub const ACCEPT_INDEX: &str = "application/json, text/javascript, */*;q=0.8";

/// Accept header for sitemaps
pub const ACCEPT_XML: &str = "application/xml, text/xml, */*;q=0.8";

/// Per-request header overrides supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchHeaders {
    pub user_agent: String,
    pub accept: String,
}

impl FetchHeaders {
    pub fn new(user_agent: impl Into<String>, accept: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            accept: accept.into(),
        }
    }

    /// Headers for a documentation page
    pub fn document(user_agent: impl Into<String>) -> Self {
        Self::new(user_agent, ACCEPT_HTML)
    }

    /// Headers for a search index file
    pub fn index(user_agent: impl Into<String>) -> Self {
        Self::new(user_agent, ACCEPT_INDEX)
    }

    /// Headers for a sitemap
    pub fn sitemap(user_agent: impl Into<String>) -> Self {
        Self::new(user_agent, ACCEPT_XML)
    }
}

/// Fetches a URL and returns its body as text
///
/// Implementations fail with [`DocsError::FetchFailure`] on non-2xx
/// responses and network errors. Rate limiting, timeouts and retries are
/// the implementation's concern; the pipeline calls it sequentially.
#[async_trait]
pub trait TextFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str, headers: &FetchHeaders) -> Result<String, DocsError>;
}

/// Supplies the `User-Agent` for each outgoing request
pub trait UserAgentSource: Send + Sync {
    fn user_agent(&self) -> String;
}

/// Always the same User-Agent
#[derive(Debug, Clone)]
pub struct StaticUserAgent(String);

impl StaticUserAgent {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self(user_agent.into())
    }
}

impl Default for StaticUserAgent {
    fn default() -> Self {
        Self::new(DEFAULT_USER_AGENT)
    }
}

impl UserAgentSource for StaticUserAgent {
    fn user_agent(&self) -> String {
        self.0.clone()
    }
}

/// Cycles through a list of User-Agents, one per request
#[derive(Debug)]
pub struct RotatingUserAgent {
    agents: Vec<String>,
    next: AtomicUsize,
}

impl RotatingUserAgent {
    pub fn new(agents: Vec<String>) -> Self {
        Self {
            agents,
            next: AtomicUsize::new(0),
        }
    }
}

impl UserAgentSource for RotatingUserAgent {
    fn user_agent(&self) -> String {
        if self.agents.is_empty() {
            return DEFAULT_USER_AGENT.to_string();
        }
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.agents.len();
        self.agents[idx].clone()
    }
}

/// Transport options for [`HttpFetcher`]
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Allow list of URL prefixes (empty allows everything)
    pub allow_prefixes: Vec<String>,
    /// Block list of URL prefixes
    pub block_prefixes: Vec<String>,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Time allowed from sending a request to receiving its response headers
    pub request_timeout: Duration,
    /// Total time allowed for reading one response body
    pub body_timeout: Duration,
    /// Minimum spacing between two requests
    pub min_request_interval: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            allow_prefixes: Vec::new(),
            block_prefixes: Vec::new(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(15),
            body_timeout: Duration::from_secs(30),
            min_request_interval: Duration::from_millis(100),
        }
    }
}

/// Rate-limited reqwest fetcher
pub struct HttpFetcher {
    client: reqwest::Client,
    options: FetchOptions,
    last_request: Mutex<Option<Instant>>,
}

impl HttpFetcher {
    /// Build a fetcher with its own HTTP client
    pub fn new(options: FetchOptions) -> Result<Self, DocsError> {
        let client = reqwest::Client::builder()
            .connect_timeout(options.connect_timeout)
            .build()
            .map_err(DocsError::ClientBuildError)?;

        Ok(Self {
            client,
            options,
            last_request: Mutex::new(None),
        })
    }

    /// Validate scheme and allow/block lists
    fn check_url(&self, url: &str) -> Result<(), DocsError> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(DocsError::InvalidUrlScheme);
        }

        if !self.options.allow_prefixes.is_empty()
            && !self
                .options
                .allow_prefixes
                .iter()
                .any(|prefix| url.starts_with(prefix))
        {
            return Err(DocsError::BlockedUrl);
        }

        if self
            .options
            .block_prefixes
            .iter()
            .any(|prefix| url.starts_with(prefix))
        {
            return Err(DocsError::BlockedUrl);
        }

        Ok(())
    }

    /// Wait until `min_request_interval` has passed since the previous request
    async fn throttle(&self) {
        let interval = self.options.min_request_interval;
        if interval.is_zero() {
            return;
        }

        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < interval {
                tokio::time::sleep(interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[async_trait]
impl TextFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str, headers: &FetchHeaders) -> Result<String, DocsError> {
        self.check_url(url)?;
        self.throttle().await;

        let user_agent = HeaderValue::from_str(&headers.user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT));
        let accept =
            HeaderValue::from_str(&headers.accept).unwrap_or_else(|_| HeaderValue::from_static("*/*"));

        let request = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .header(ACCEPT, accept)
            .send();
        let response = tokio::time::timeout(self.options.request_timeout, request)
            .await
            .map_err(|_| DocsError::FetchFailure {
                url: url.to_string(),
                status: None,
                reason: "request timed out".to_string(),
            })?
            .map_err(|e| DocsError::from_reqwest(url, e))?;

        let status = response.status();
        debug!(url, status = status.as_u16(), "Fetched");
        if !status.is_success() {
            return Err(DocsError::http_status(
                url,
                status.as_u16(),
                status.canonical_reason(),
            ));
        }

        let (body, truncated) =
            read_body_with_timeout(response.bytes_stream(), self.options.body_timeout)
                .await
                .map_err(|e| DocsError::from_reqwest(url, e))?;
        if truncated {
            warn!(url, "Body read incomplete, using partial content");
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// Read response body with timeout, returning partial content if timeout occurs
///
/// A stream error after some bytes arrived keeps the partial body; an error
/// before the first byte is returned.
async fn read_body_with_timeout<S, E>(stream: S, timeout: Duration) -> Result<(Bytes, bool), E>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Display,
{
    let mut body = Vec::new();
    let mut stream = std::pin::pin!(stream);
    let deadline = Instant::now() + timeout;

    loop {
        let chunk_future = stream.next();
        let timeout_future = tokio::time::sleep_until(deadline);

        tokio::select! {
            chunk = chunk_future => {
                match chunk {
                    Some(Ok(bytes)) => {
                        body.extend_from_slice(&bytes);
                    }
                    Some(Err(e)) => {
                        error!("Error reading body chunk: {}", e);
                        if body.is_empty() {
                            return Err(e);
                        }
                        return Ok((Bytes::from(body), true));
                    }
                    None => {
                        return Ok((Bytes::from(body), false));
                    }
                }
            }
            _ = timeout_future => {
                warn!("Body timeout reached, returning partial content");
                return Ok((Bytes::from(body), true));
            }
        }
    }
}

/// In-memory fetcher for unit tests
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    pub(crate) struct MapFetcher {
        pages: HashMap<String, String>,
        requested: std::sync::Mutex<Vec<String>>,
        headers: std::sync::Mutex<Vec<FetchHeaders>>,
    }

    impl MapFetcher {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn with(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), body.to_string());
            self
        }

        pub(crate) fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }

        pub(crate) fn headers(&self) -> Vec<FetchHeaders> {
            self.headers.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextFetcher for MapFetcher {
        async fn fetch_text(&self, url: &str, headers: &FetchHeaders) -> Result<String, DocsError> {
            self.requested.lock().unwrap().push(url.to_string());
            self.headers.lock().unwrap().push(headers.clone());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| DocsError::http_status(url, 404, Some("Not Found")))
        }
    }
}
