//! The network seam between `ConnpassClient` and an HTTP stack.

use std::fmt;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes one `HttpRequest`.
///
/// Non-2xx statuses are returned as data, not as errors; the client decides
/// what a status means. Implementations must be safe to share between tasks
/// if the client is.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request).await
    }
}

/// Default transport backed by one `reqwest::Client`.
///
/// Clones share the underlying connection pool.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

static SHARED: OnceLock<Arc<ReqwestTransport>> = OnceLock::new();

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Process-wide transport used by clients built without one, so they
    /// share a single connection pool.
    pub fn shared() -> Arc<dyn Transport> {
        SHARED.get_or_init(|| Arc::new(ReqwestTransport::default())).clone()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut headers = HeaderMap::with_capacity(request.headers.len());
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TransportError::InvalidRequest(format!("header {name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TransportError::InvalidRequest(format!("header {name}: {e}")))?;
            headers.append(name, value);
        }

        let response = self.client.get(&request.url).headers(headers).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}
