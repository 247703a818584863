//! Request builder, response parser and search entry point for the
//! connpass API.
//!
//! # Design
//! `ConnpassClient` holds only its `ClientConfig` and a shared `Transport`;
//! it keeps no state between calls. Search is split in three steps:
//! `build_search` produces an `HttpRequest`, the transport executes it, and
//! `parse_search` turns the `HttpResponse` into a `SearchResult`. The first
//! and last steps never touch the network, so they are usable on their own
//! by callers that bring their own I/O.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::config::ClientConfig;
use crate::error::{ApiError, Error, Result, TransportError};
use crate::http::{HttpRequest, HttpResponse};
use crate::params::{search_params, Param, QueryParams};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::SearchResult;

/// Searches connpass events.
///
/// Implemented by `ConnpassClient`; code that only needs to search can take
/// this trait and be tested against a fake.
#[async_trait]
pub trait SearchService: Send + Sync {
    async fn search(&self, cancel: &CancellationToken, params: &QueryParams) -> Result<SearchResult>;
}

/// Client for the connpass event search API.
#[derive(Debug, Clone)]
pub struct ConnpassClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
}

impl Default for ConnpassClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnpassClient {
    /// Client for the public API with the default transport and user agent.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ConnpassClientBuilder {
        ConnpassClientBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn user_agent(&self) -> &str {
        &self.config.user_agent
    }

    /// Build the GET request for a search. The `?` is omitted when `params`
    /// is empty.
    pub fn build_search(&self, params: &QueryParams) -> std::result::Result<HttpRequest, TransportError> {
        let mut url = Url::parse(&format!("{}/event", self.config.base_url))
            .map_err(|e| TransportError::InvalidRequest(format!("{}: {e}", self.config.base_url)))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params.iter());
        }

        Ok(HttpRequest {
            url: url.into(),
            headers: vec![("user-agent".to_string(), self.config.user_agent.clone())],
        })
    }

    /// Map a search response to a `SearchResult`.
    ///
    /// Statuses outside `[200, 300)` become `Error::Api` without looking at
    /// the body.
    pub fn parse_search(&self, response: HttpResponse) -> Result<SearchResult> {
        check_status(&response)?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    /// Run one search. Cancelling `cancel` while the request is in flight
    /// aborts it with `TransportError::Cancelled`.
    pub async fn search(&self, cancel: &CancellationToken, params: &QueryParams) -> Result<SearchResult> {
        let request = self.build_search(params)?;
        debug!(url = %request.url, "sending search request");

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                trace!("search cancelled");
                return Err(TransportError::Cancelled.into());
            }
            response = self.transport.execute(request) => response?,
        };
        debug!(status = response.status, bytes = response.body.len(), "received search response");

        self.parse_search(response)
    }

    /// Validate `params` and search with them.
    ///
    /// Validation failures come back as `Error::Params` and no request is
    /// sent.
    pub async fn search_with<I>(&self, cancel: &CancellationToken, params: I) -> Result<SearchResult>
    where
        I: IntoIterator<Item = Param>,
    {
        let params = search_params(params)?;
        self.search(cancel, &params).await
    }
}

#[async_trait]
impl SearchService for ConnpassClient {
    async fn search(&self, cancel: &CancellationToken, params: &QueryParams) -> Result<SearchResult> {
        ConnpassClient::search(self, cancel, params).await
    }
}

/// Options for `ConnpassClient`. Anything not set takes its default.
#[derive(Debug, Default)]
pub struct ConnpassClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl ConnpassClientBuilder {
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn build(self) -> ConnpassClient {
        let mut config = self.config;
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        ConnpassClient {
            config,
            transport: self
                .transport
                .unwrap_or_else(ReqwestTransport::shared),
        }
    }
}

fn check_status(response: &HttpResponse) -> std::result::Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError {
        status: response.status,
    })
}
