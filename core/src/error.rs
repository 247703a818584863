//! Error types for the connpass client.
//!
//! # Design
//! Failures fall into four groups that callers handle differently:
//! - `ValidationError` / `ParamErrors`: bad caller input, raised before any
//!   request is built.
//! - `TransportError`: the request could not be built or the round-trip
//!   failed (including cancellation).
//! - `ApiError`: the server answered outside `[200, 300)`. Only the status
//!   code is kept.
//! - `Error::Decode`: the body was not a search result.
//!
//! `Error` wraps the last three (plus `ParamErrors` for the one-call
//! validate-and-search path) so `search` has a single error type.

use std::fmt;

/// A single rejected search parameter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid event id: {0}")]
    EventId(i64),

    /// Shared by `keyword` and `keyword_or`.
    #[error("empty keyword")]
    EmptyKeyword,

    #[error("year must be between 0 and 9999: {0}")]
    Year(i32),

    #[error("invalid month: {0}")]
    Month(u32),

    /// The day does not exist in the requested month, e.g. February 30.
    #[error("invalid day: {0}")]
    Day(u32),

    /// Shared by `nickname` and `owner_nickname`.
    #[error("empty nickname")]
    EmptyNickname,

    #[error("invalid series id: {0}")]
    SeriesId(i64),

    #[error("invalid start: {0}")]
    Start(i64),

    #[error("invalid order: {0}")]
    Order(i64),

    #[error("count must be between 1 and 100: {0}")]
    Count(i64),
}

/// Every validation failure from one aggregation run, in parameter order.
///
/// Usable as one opaque error (`Display` joins the messages with `"; "`) or
/// iterated for the individual failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamErrors(Vec<ValidationError>);

impl ParamErrors {
    pub(crate) fn new(errors: Vec<ValidationError>) -> Self {
        Self(errors)
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ParamErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParamErrors {}

impl IntoIterator for ParamErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParamErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The server answered with a status outside `[200, 300)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unexpected status code: {status}")]
pub struct ApiError {
    pub status: u16,
}

/// The request could not be built or did not complete.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("cannot create HTTP request: {0}")]
    InvalidRequest(String),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The caller's cancellation token fired before a response arrived.
    #[error("request cancelled")]
    Cancelled,

    /// Failure reported by a caller-supplied transport.
    #[error("transport error: {0}")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors returned by `ConnpassClient`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Params(#[from] ParamErrors),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("cannot parse HTTP body: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_errors_display_joins_messages() {
        let errs = ParamErrors::new(vec![ValidationError::EventId(-1), ValidationError::EmptyKeyword]);
        assert_eq!(errs.to_string(), "invalid event id: -1; empty keyword");
    }

    #[test]
    fn param_errors_iterates_in_order() {
        let errs = ParamErrors::new(vec![ValidationError::Count(0), ValidationError::Order(4)]);
        let collected: Vec<_> = errs.into_iter().collect();
        assert_eq!(collected, vec![ValidationError::Count(0), ValidationError::Order(4)]);
    }

    #[test]
    fn api_error_keeps_only_status() {
        let err = Error::from(ApiError { status: 503 });
        assert_eq!(err.to_string(), "unexpected status code: 503");
        assert!(matches!(err, Error::Api(ApiError { status: 503 })));
    }
}
