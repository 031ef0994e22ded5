//! Request builder, response parser and one-shot operations for the Pocket
//! v3 API.
//!
//! # Design
//! `PocketClient` holds the consumer key, two base URLs and a shared
//! transport; nothing changes between calls. Every networked operation is
//! split into a `build_*` method that produces an `HttpRequest` and a
//! `parse_*` method that consumes an `HttpResponse`. The one-shot methods
//! (`get_request_token`, `authorize`, `add`) run the round trip on the
//! configured `Transport` between the two halves. Hosts with their own HTTP
//! stack can drive the halves directly. Each one-shot method has a
//! `*_with_timeout` twin that bounds that single call by its own deadline
//! instead of the client-wide one.
//!
//! Requests are JSON, but the token endpoints answer with a URL-encoded query
//! string. That asymmetry is the service's protocol and is kept as is.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ClientBuilder;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::types::{
    AddInput, AuthorizeRequest, AuthorizeResult, RequestTokenRequest, RequestTokenResponse,
};

const ENDPOINT_REQUEST_TOKEN: &str = "/oauth/request";
const ENDPOINT_AUTHORIZE: &str = "/oauth/authorize";
const ENDPOINT_ADD: &str = "/add";

const X_ERROR_HEADER: &str = "X-Error";
const X_ERROR_CODE_HEADER: &str = "X-Error-Code";

/// Client for the Pocket v3 API.
///
/// Cheap to clone; clones share the transport. Safe to use from several
/// threads at once.
#[derive(Clone)]
pub struct PocketClient {
    consumer_key: String,
    base_url: String,
    authorize_url: String,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for PocketClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PocketClient")
            .field("base_url", &self.base_url)
            .field("authorize_url", &self.authorize_url)
            .finish_non_exhaustive()
    }
}

impl PocketClient {
    /// Client with the default endpoints, timeout and transport.
    pub fn new(consumer_key: &str) -> Result<Self, ApiError> {
        ClientBuilder::new(consumer_key).build()
    }

    pub fn builder(consumer_key: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(consumer_key)
    }

    pub(crate) fn from_parts(
        consumer_key: String,
        base_url: String,
        authorize_url: String,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            consumer_key,
            base_url,
            authorize_url,
            transport,
        }
    }

    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Obtain a request token to start the authorization handshake.
    pub fn get_request_token(&self, redirect_uri: &str) -> Result<String, ApiError> {
        let request = self.build_request_token(redirect_uri)?;
        self.parse_request_token(self.send(&request)?)
    }

    /// `get_request_token` bounded by `timeout` instead of the client-wide
    /// deadline.
    pub fn get_request_token_with_timeout(
        &self,
        redirect_uri: &str,
        timeout: Duration,
    ) -> Result<String, ApiError> {
        let request = with_deadline(self.build_request_token(redirect_uri)?, timeout)?;
        self.parse_request_token(self.send(&request)?)
    }

    /// Link the end user must visit to approve `request_token`.
    ///
    /// Both values are substituted verbatim; a redirect URI containing
    /// reserved characters must already be percent-encoded.
    pub fn get_authorization_url(
        &self,
        request_token: &str,
        redirect_uri: &str,
    ) -> Result<String, ApiError> {
        if request_token.is_empty() {
            return Err(ApiError::InvalidArgument("request token"));
        }
        if redirect_uri.is_empty() {
            return Err(ApiError::InvalidArgument("redirect URI"));
        }
        Ok(format!(
            "{}?request_token={request_token}&redirect_uri={redirect_uri}",
            self.authorize_url
        ))
    }

    /// Exchange an approved request token for an access token.
    pub fn authorize(&self, request_token: &str) -> Result<AuthorizeResult, ApiError> {
        let request = self.build_authorize(request_token)?;
        self.parse_authorize(self.send(&request)?)
    }

    pub fn authorize_with_timeout(
        &self,
        request_token: &str,
        timeout: Duration,
    ) -> Result<AuthorizeResult, ApiError> {
        let request = with_deadline(self.build_authorize(request_token)?, timeout)?;
        self.parse_authorize(self.send(&request)?)
    }

    /// Add an item to the list of the user owning `input.access_token`.
    pub fn add(&self, input: &AddInput) -> Result<(), ApiError> {
        let request = self.build_add(input)?;
        self.parse_add(self.send(&request)?)
    }

    pub fn add_with_timeout(&self, input: &AddInput, timeout: Duration) -> Result<(), ApiError> {
        let request = with_deadline(self.build_add(input)?, timeout)?;
        self.parse_add(self.send(&request)?)
    }

    pub fn build_request_token(&self, redirect_uri: &str) -> Result<HttpRequest, ApiError> {
        let body = RequestTokenRequest {
            consumer_key: self.consumer_key.clone(),
            redirect_uri: redirect_uri.to_string(),
        };
        self.build_post(ENDPOINT_REQUEST_TOKEN, &body)
    }

    pub fn build_authorize(&self, request_token: &str) -> Result<HttpRequest, ApiError> {
        if request_token.is_empty() {
            return Err(ApiError::InvalidArgument("request token"));
        }
        let body = AuthorizeRequest {
            consumer_key: self.consumer_key.clone(),
            code: request_token.to_string(),
        };
        self.build_post(ENDPOINT_AUTHORIZE, &body)
    }

    pub fn build_add(&self, input: &AddInput) -> Result<HttpRequest, ApiError> {
        input.validate()?;
        self.build_post(ENDPOINT_ADD, &input.to_request(&self.consumer_key))
    }

    pub fn parse_request_token(&self, response: HttpResponse) -> Result<String, ApiError> {
        let decoded: RequestTokenResponse = decode_success(&response)?;
        if decoded.code.is_empty() {
            return Err(ApiError::EmptyResponse("code"));
        }
        Ok(decoded.code)
    }

    pub fn parse_authorize(&self, response: HttpResponse) -> Result<AuthorizeResult, ApiError> {
        let decoded: AuthorizeResult = decode_success(&response)?;
        if decoded.access_token.is_empty() {
            return Err(ApiError::EmptyResponse("access_token"));
        }
        Ok(decoded)
    }

    /// The add endpoint's success body carries nothing the client needs.
    pub fn parse_add(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    fn build_post<T: Serialize>(&self, endpoint: &str, body: &T) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest::post_json(
            format!("{}{endpoint}", self.base_url),
            body,
        ))
    }

    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = ?request.method, url = %request.url, timeout = ?request.timeout, "sending request");
        let response = self.transport.execute(request).map_err(|err| {
            warn!(url = %request.url, timeout = err.is_timeout(), error = %err, "request failed");
            err
        })?;
        debug!(status = response.status, "received response");
        Ok(response)
    }
}

fn with_deadline(request: HttpRequest, timeout: Duration) -> Result<HttpRequest, ApiError> {
    if timeout.is_zero() {
        return Err(ApiError::InvalidArgument("timeout"));
    }
    Ok(request.with_timeout(timeout))
}

/// Anything but 200 is a rejection; the service explains it in `X-Error`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.status == 200 {
        return Ok(());
    }
    let message = response.header(X_ERROR_HEADER).unwrap_or_default().to_string();
    let code = response.header(X_ERROR_CODE_HEADER).map(str::to_string);
    warn!(status = response.status, code = ?code, message = %message, "API rejected request");
    Err(ApiError::NonSuccessStatus {
        status: response.status,
        message,
        code,
    })
}

fn decode_success<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    check_status(response)?;
    serde_urlencoded::from_str(response.body.trim())
        .map_err(|e| ApiError::ResponseDecode(e.to_string()))
}
