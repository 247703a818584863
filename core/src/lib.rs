//! Client for the connpass event search API.
//!
//! # Overview
//! Build a validated `QueryParams` from `Param` values with
//! `search_params`, then hand it to `ConnpassClient::search`:
//!
//! ```no_run
//! use connpass_core::{search_params, ConnpassClient, Param};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> connpass_core::Result<()> {
//! let params = search_params([Param::keyword("rust"), Param::count(10)])?;
//! let result = ConnpassClient::new()
//!     .search(&CancellationToken::new(), &params)
//!     .await?;
//! for event in &result.events {
//!     println!("{}", event.title);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Design
//! - Parameters are validated together: `search_params` reports every bad
//!   input at once as `ParamErrors`.
//! - `ConnpassClient` is stateless apart from its config. `build_search` and
//!   `parse_search` are pure, and `search` joins them through a `Transport`
//!   (reqwest by default).
//! - Cancellation goes through a `CancellationToken`; there are no retries or
//!   timeouts of our own.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod params;
pub mod transport;
pub mod types;

pub use client::{ConnpassClient, ConnpassClientBuilder, SearchService};
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
pub use error::{ApiError, Error, ParamErrors, Result, TransportError, ValidationError};
pub use http::{HttpRequest, HttpResponse};
pub use params::{search_params, OrderBy, Param, QueryParams};
pub use transport::{ReqwestTransport, Transport};
pub use types::{Event, EventType, SearchResult, Series};
