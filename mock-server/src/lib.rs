//! In-memory fake of the Pocket v3 API.
//!
//! Serves the OAuth endpoints, the approval page and `/v3/add` with the
//! service's error convention: a non-200 status plus `X-Error` and
//! `X-Error-Code` headers. Successful token replies are URL-encoded query
//! strings, like the real service.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};
use uuid::Uuid;

/// An item stored by `POST /v3/add`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub url: String,
    pub title: String,
    pub tags: Vec<String>,
    pub username: String,
}

#[derive(Clone, Debug, Default)]
struct RequestToken {
    approved: bool,
    used: bool,
}

/// Everything the fake service remembers.
#[derive(Debug)]
pub struct Pocket {
    consumer_key: String,
    username: String,
    request_tokens: HashMap<String, RequestToken>,
    access_tokens: HashMap<String, String>,
    items: Vec<Item>,
}

impl Pocket {
    /// A service that accepts one consumer key and approves on behalf of
    /// `username`.
    pub fn new(consumer_key: &str, username: &str) -> Self {
        Self {
            consumer_key: consumer_key.to_string(),
            username: username.to_string(),
            request_tokens: HashMap::new(),
            access_tokens: HashMap::new(),
            items: Vec::new(),
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Register an access token directly, skipping the handshake.
    pub fn grant_access_token(&mut self, access_token: &str) {
        self.access_tokens
            .insert(access_token.to_string(), self.username.clone());
    }
}

pub type Db = Arc<RwLock<Pocket>>;

#[derive(Deserialize)]
pub struct RequestTokenBody {
    #[serde(default)]
    pub consumer_key: String,
    #[serde(default)]
    pub redirect_uri: String,
}

#[derive(Deserialize)]
pub struct AuthorizeBody {
    #[serde(default)]
    pub consumer_key: String,
    #[serde(default)]
    pub code: String,
}

#[derive(Deserialize)]
pub struct AddBody {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub consumer_key: String,
}

#[derive(Deserialize)]
pub struct ApprovalQuery {
    #[serde(default)]
    pub request_token: String,
    #[serde(default)]
    pub redirect_uri: String,
    #[serde(default)]
    pub reject: bool,
}

/// A rejection in the service's style.
#[derive(Debug)]
pub struct PocketError {
    status: StatusCode,
    code: Option<u16>,
    message: &'static str,
}

impl PocketError {
    const fn new(status: StatusCode, code: Option<u16>, message: &'static str) -> Self {
        Self {
            status,
            code,
            message,
        }
    }
}

impl IntoResponse for PocketError {
    fn into_response(self) -> Response {
        warn!(status = %self.status, code = ?self.code, message = self.message, "rejecting request");
        let mut response = (self.status, [("X-Error", self.message)]).into_response();
        if let Some(code) = self.code {
            response
                .headers_mut()
                .insert("X-Error-Code", HeaderValue::from(code));
        }
        response
    }
}

const MISSING_CONSUMER_KEY: PocketError =
    PocketError::new(StatusCode::BAD_REQUEST, Some(138), "Missing consumer key.");
const MISSING_REDIRECT_URL: PocketError =
    PocketError::new(StatusCode::BAD_REQUEST, Some(140), "Missing redirect url.");
const INVALID_CONSUMER_KEY: PocketError =
    PocketError::new(StatusCode::FORBIDDEN, Some(152), "Invalid consumer key.");
const MISSING_CODE: PocketError =
    PocketError::new(StatusCode::BAD_REQUEST, Some(182), "Missing code.");
const CODE_NOT_FOUND: PocketError =
    PocketError::new(StatusCode::BAD_REQUEST, Some(185), "Code not found.");
const USER_REJECTED_CODE: PocketError =
    PocketError::new(StatusCode::FORBIDDEN, Some(158), "User rejected code.");
const ALREADY_USED_CODE: PocketError =
    PocketError::new(StatusCode::FORBIDDEN, Some(159), "Already used code.");
const INVALID_ACCESS_TOKEN: PocketError =
    PocketError::new(StatusCode::UNAUTHORIZED, Some(107), "Invalid access token.");
const MISSING_URL: PocketError = PocketError::new(StatusCode::BAD_REQUEST, None, "Missing url.");
const INVALID_BODY: PocketError =
    PocketError::new(StatusCode::BAD_REQUEST, None, "Invalid request body.");

pub fn new_db(consumer_key: &str, username: &str) -> Db {
    Arc::new(RwLock::new(Pocket::new(consumer_key, username)))
}

pub fn app(db: Db) -> Router {
    Router::new()
        .route("/v3/oauth/request", post(request_token))
        .route("/v3/oauth/authorize", post(authorize))
        .route("/v3/add", post(add))
        .route("/auth/authorize", get(approve))
        .with_state(db)
}

pub async fn run(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app(db)).await
}

fn check_consumer_key(pocket: &Pocket, consumer_key: &str) -> Result<(), PocketError> {
    if consumer_key.is_empty() {
        return Err(MISSING_CONSUMER_KEY);
    }
    if consumer_key != pocket.consumer_key {
        return Err(INVALID_CONSUMER_KEY);
    }
    Ok(())
}

fn form_response(pairs: &[(&str, &str)]) -> Response {
    match serde_urlencoded::to_string(pairs) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/x-www-form-urlencoded")],
            body,
        )
            .into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn request_token(
    State(db): State<Db>,
    body: Result<Json<RequestTokenBody>, JsonRejection>,
) -> Result<Response, PocketError> {
    let Json(input) = body.map_err(|_| INVALID_BODY)?;
    let mut pocket = db.write().await;
    check_consumer_key(&pocket, &input.consumer_key)?;
    if input.redirect_uri.is_empty() {
        return Err(MISSING_REDIRECT_URL);
    }
    let code = Uuid::new_v4().to_string();
    pocket
        .request_tokens
        .insert(code.clone(), RequestToken::default());
    info!("issued request token");
    Ok(form_response(&[("code", code.as_str())]))
}

async fn approve(State(db): State<Db>, Query(query): Query<ApprovalQuery>) -> Response {
    let mut pocket = db.write().await;
    let Some(token) = pocket.request_tokens.get_mut(&query.request_token) else {
        return (StatusCode::NOT_FOUND, "unknown request token").into_response();
    };
    if query.reject {
        info!("user rejected request token");
        return (StatusCode::OK, "access denied").into_response();
    }
    token.approved = true;
    info!(redirect_uri = %query.redirect_uri, "user approved request token");
    (StatusCode::OK, "access granted").into_response()
}

async fn authorize(
    State(db): State<Db>,
    body: Result<Json<AuthorizeBody>, JsonRejection>,
) -> Result<Response, PocketError> {
    let Json(input) = body.map_err(|_| INVALID_BODY)?;
    let mut pocket = db.write().await;
    check_consumer_key(&pocket, &input.consumer_key)?;
    if input.code.is_empty() {
        return Err(MISSING_CODE);
    }
    let token = pocket
        .request_tokens
        .get_mut(&input.code)
        .ok_or(CODE_NOT_FOUND)?;
    if token.used {
        return Err(ALREADY_USED_CODE);
    }
    if !token.approved {
        return Err(USER_REJECTED_CODE);
    }
    token.used = true;

    let access_token = Uuid::new_v4().to_string();
    let username = pocket.username.clone();
    pocket
        .access_tokens
        .insert(access_token.clone(), username.clone());
    info!("issued access token");
    Ok(form_response(&[
        ("access_token", access_token.as_str()),
        ("username", username.as_str()),
    ]))
}

async fn add(
    State(db): State<Db>,
    body: Result<Json<AddBody>, JsonRejection>,
) -> Result<StatusCode, PocketError> {
    let Json(input) = body.map_err(|_| INVALID_BODY)?;
    let mut pocket = db.write().await;
    check_consumer_key(&pocket, &input.consumer_key)?;
    let username = pocket
        .access_tokens
        .get(&input.access_token)
        .cloned()
        .ok_or(INVALID_ACCESS_TOKEN)?;
    if input.url.is_empty() {
        return Err(MISSING_URL);
    }
    let tags = input
        .tags
        .split(',')
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect();
    pocket.items.push(Item {
        url: input.url,
        title: input.title,
        tags,
        username,
    });
    info!(items = pocket.items.len(), "added item");
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_token_body_defaults_missing_fields() {
        let input: RequestTokenBody = serde_json::from_str(r#"{"consumer_key":"key"}"#).unwrap();
        assert_eq!(input.consumer_key, "key");
        assert!(input.redirect_uri.is_empty());
    }

    #[test]
    fn add_body_accepts_minimal_payload() {
        let input: AddBody = serde_json::from_str(
            r#"{"url":"http://example.link","access_token":"t","consumer_key":"k"}"#,
        )
        .unwrap();
        assert_eq!(input.url, "http://example.link");
        assert!(input.title.is_empty());
        assert!(input.tags.is_empty());
    }

    #[test]
    fn consumer_key_checks() {
        let pocket = Pocket::new("key", "bob");
        assert_eq!(check_consumer_key(&pocket, "").unwrap_err().code, Some(138));
        assert_eq!(check_consumer_key(&pocket, "other").unwrap_err().code, Some(152));
        assert!(check_consumer_key(&pocket, "key").is_ok());
    }

    #[test]
    fn granted_token_belongs_to_configured_user() {
        let mut pocket = Pocket::new("key", "bob");
        pocket.grant_access_token("token");
        assert_eq!(pocket.access_tokens.get("token").map(String::as_str), Some("bob"));
    }
}
