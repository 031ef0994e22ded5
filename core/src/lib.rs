//! Blocking client for the Pocket v3 API.
//!
//! # Overview
//! Covers the OAuth-style handshake (request token, authorization link,
//! access token exchange) and adding items to a user's list. Each networked
//! operation is available as a one-shot call on `PocketClient` and as a
//! `build_*` / `parse_*` pair for hosts that run the HTTP round trip
//! themselves.
//!
//! # Design
//! - `PocketClient` is immutable after construction; the handshake state
//!   lives with the caller, who stores the access token for later `add` calls.
//! - I/O goes through the `Transport` trait. `UreqTransport` is the default,
//!   with a 5 second deadline per call.
//! - Requests are JSON; token responses are URL-encoded query strings.
//! - Errors are a single `ApiError`, with local validation failures kept
//!   apart from server rejections and transport failures.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod types;

pub use client::PocketClient;
pub use config::{ClientBuilder, DEFAULT_AUTHORIZE_URL, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::{ApiError, TransportError, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use types::{AddInput, AddRequest, AuthorizeRequest, AuthorizeResult, RequestTokenRequest};
