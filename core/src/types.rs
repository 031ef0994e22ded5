//! Request and response DTOs for the Pocket v3 API.
//!
//! # Design
//! Request bodies are JSON; the token endpoints answer with a URL-encoded
//! query string. The response structs below are deserialized with
//! `serde_urlencoded`, so missing keys default to empty strings and the
//! client decides which empties are errors.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Body of `POST /oauth/request`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestTokenRequest {
    pub consumer_key: String,
    pub redirect_uri: String,
}

/// Query-string reply of `POST /oauth/request`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RequestTokenResponse {
    #[serde(default)]
    pub code: String,
}

/// Body of `POST /oauth/authorize`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorizeRequest {
    pub consumer_key: String,
    pub code: String,
}

/// Outcome of a successful authorization. `username` is empty when the
/// service leaves it out.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorizeResult {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub username: String,
}

/// A new item for the user's list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddInput {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub access_token: String,
}

impl AddInput {
    pub fn new(url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            access_token: access_token.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// URL is checked before the access token.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingUrl);
        }
        if self.access_token.is_empty() {
            return Err(ValidationError::MissingAccessToken);
        }
        Ok(())
    }

    /// Wire projection of this input, signed with `consumer_key`.
    pub fn to_request(&self, consumer_key: &str) -> AddRequest {
        AddRequest {
            url: self.url.clone(),
            title: self.title.clone().filter(|t| !t.is_empty()),
            tags: Some(self.tags.join(",")).filter(|t| !t.is_empty()),
            access_token: self.access_token.clone(),
            consumer_key: consumer_key.to_string(),
        }
    }
}

/// Body of `POST /add`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddRequest {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Comma-joined tag list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    pub access_token: String,
    pub consumer_key: String,
}
