//! Error types for the Pocket API client.
//!
//! # Design
//! One `ApiError` covers every operation so callers can match on the failure
//! class without caring which endpoint produced it. Local checks
//! (`Configuration`, `InvalidArgument`, `Validation`) never touch the network.
//! Server rejections carry the `X-Error` message verbatim, plus the numeric
//! `X-Error-Code` when the service sends one.

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by `PocketClient`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The client could not be constructed (empty consumer key).
    #[error("invalid client configuration: {0}")]
    Configuration(String),

    /// A required argument of a local-only call was empty.
    #[error("invalid argument: {0} is empty")]
    InvalidArgument(&'static str),

    /// `AddInput` failed validation before any request was sent.
    #[error("invalid add input: {0}")]
    Validation(#[from] ValidationError),

    /// The HTTP exchange could not be completed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a status other than 200.
    #[error("HTTP {status}: {message}")]
    NonSuccessStatus {
        status: u16,
        /// Contents of the `X-Error` header, empty if the header was absent.
        message: String,
        /// Contents of the `X-Error-Code` header.
        code: Option<String>,
    },

    /// The response body was not a valid URL-encoded query string.
    #[error("response decoding failed: {0}")]
    ResponseDecode(String),

    /// The response decoded but the named field was missing or empty.
    #[error("empty {0} in API response")]
    EmptyResponse(&'static str),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Why an `AddInput` was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("required URL value is empty")]
    MissingUrl,
    #[error("access token is empty")]
    MissingAccessToken,
}

/// Failure to complete an HTTP round trip.
#[derive(Debug, Error)]
#[error("transport failure: {source}")]
pub struct TransportError {
    timed_out: bool,
    #[source]
    source: BoxError,
}

impl TransportError {
    pub fn new(source: impl Into<BoxError>) -> Self {
        Self {
            timed_out: false,
            source: source.into(),
        }
    }

    /// A failure caused by the request deadline expiring.
    pub fn timeout(source: impl Into<BoxError>) -> Self {
        Self {
            timed_out: true,
            source: source.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.timed_out
    }
}
