//! Client construction and defaults.

use std::sync::Arc;
use std::time::Duration;

use crate::client::PocketClient;
use crate::error::ApiError;
use crate::http::{Transport, UreqTransport};

/// Base of every API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://getpocket.com/v3";
/// Page the end user visits to approve a request token.
pub const DEFAULT_AUTHORIZE_URL: &str = "https://getpocket.com/auth/authorize";
/// Deadline applied to each call by the default transport.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Builder for `PocketClient`.
///
/// A caller-supplied transport takes precedence over `timeout`; the timeout
/// only configures the default `UreqTransport`.
pub struct ClientBuilder {
    consumer_key: String,
    base_url: String,
    authorize_url: String,
    timeout: Duration,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    pub fn new(consumer_key: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            transport: None,
        }
    }

    #[must_use]
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn authorize_url(mut self, authorize_url: &str) -> Self {
        self.authorize_url = authorize_url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<PocketClient, ApiError> {
        if self.consumer_key.is_empty() {
            return Err(ApiError::Configuration("consumer key is empty".to_string()));
        }
        if self.base_url.is_empty() {
            return Err(ApiError::Configuration("base URL is empty".to_string()));
        }
        if self.authorize_url.is_empty() {
            return Err(ApiError::Configuration("authorize URL is empty".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(ApiError::Configuration("timeout must be non-zero".to_string()));
        }
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(UreqTransport::new(self.timeout)),
        };
        Ok(PocketClient::from_parts(
            self.consumer_key,
            self.base_url,
            self.authorize_url,
            transport,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_consumer_key_is_rejected() {
        let err = ClientBuilder::new("").build().unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
    }

    #[test]
    fn defaults_point_at_the_public_service() {
        let client = ClientBuilder::new("key").build().unwrap();
        assert_eq!(client.consumer_key(), "key");
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn trailing_slashes_are_stripped() {
        let client = ClientBuilder::new("key")
            .base_url("http://localhost:3000/v3/")
            .authorize_url("http://localhost:3000/auth/authorize/")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000/v3");
        assert_eq!(
            client.get_authorization_url("t", "u").unwrap(),
            "http://localhost:3000/auth/authorize?request_token=t&redirect_uri=u"
        );
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = ClientBuilder::new("key")
            .timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
    }

    #[test]
    fn empty_base_url_is_rejected() {
        let err = ClientBuilder::new("key").base_url("/").build().unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
    }
}
