//! HTTP values and the transport seam.
//!
//! # Design
//! `HttpRequest` and `HttpResponse` describe a round trip as plain data. The
//! client builds requests and parses responses without touching the network;
//! a `Transport` executes the actual I/O in between. `UreqTransport` is the
//! default, blocking implementation. Callers swap it for a custom agent
//! (proxies, TLS roots) or a test double through `ClientBuilder::transport`.

use std::time::Duration;

use crate::error::TransportError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    /// Deadline for this round trip only; `None` keeps the transport's own.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// A JSON `POST` carrying `body`.
    pub fn post_json(url: String, body: String) -> Self {
        Self {
            method: HttpMethod::Post,
            url,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
            timeout: None,
        }
    }

    /// A body-less `GET` that asks for a JSON representation.
    pub fn get(url: String) -> Self {
        Self {
            method: HttpMethod::Get,
            url,
            headers: vec![("accept".to_string(), "application/json".to_string())],
            body: None,
            timeout: None,
        }
    }

    /// Bound this request by `timeout` instead of the transport's default.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// An HTTP response described as plain data.
///
/// Header values and the body are kept even when they are not valid UTF-8;
/// offending bytes are replaced with U+FFFD.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// Case-insensitive lookup of the first header named `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Executes one HTTP round trip.
///
/// Implementations must return non-2xx responses as `Ok` data; only failures
/// to complete the exchange (DNS, connect, timeout, broken body) are `Err`.
/// A request carrying its own `timeout` must be bounded by it.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by a `ureq` agent.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Agent with a global per-call deadline and status codes reported as data.
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }

    /// Wrap an agent configured by the caller. The agent must be built with
    /// `http_status_as_error(false)` or non-200 replies surface as transport
    /// failures instead of `NonSuccessStatus`.
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(&request.url);
                if let Some(timeout) = request.timeout {
                    builder = builder.config().timeout_global(Some(timeout)).build();
                }
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(&request.url);
                if let Some(timeout) = request.timeout {
                    builder = builder.config().timeout_global(Some(timeout)).build();
                }
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match &request.body {
                    Some(body) => builder.send(body.as_str()),
                    None => builder.send_empty(),
                }
            }
        };
        let mut response = result.map_err(ureq_error)?;

        // Status and headers are data for the caller to judge; only a body
        // that cannot be read off the wire is a transport failure.
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let bytes = response.body_mut().read_to_vec().map_err(ureq_error)?;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn ureq_error(err: ureq::Error) -> TransportError {
    let timed_out = match &err {
        ureq::Error::Timeout(_) => true,
        ureq::Error::Io(io) => io.kind() == std::io::ErrorKind::TimedOut,
        _ => false,
    };
    if timed_out {
        TransportError::timeout(err)
    } else {
        TransportError::new(err)
    }
}
