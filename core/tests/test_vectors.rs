//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results. Request bodies are compared as parsed JSON so
//! field order does not matter.

use pocket_core::{
    AddInput, ApiError, AuthorizeResult, HttpMethod, HttpRequest, HttpResponse, PocketClient,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000/v3";

fn client(vectors: &Value) -> PocketClient {
    PocketClient::builder(vectors["consumer_key"].as_str().unwrap())
        .base_url(BASE_URL)
        .build()
        .unwrap()
}

fn load(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap()
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        other => panic!("unknown method: {other}"),
    }
}

fn pairs(value: &Value) -> Vec<(String, String)> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect()
}

fn assert_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: url");
    assert_eq!(req.headers, pairs(&expected["headers"]), "{name}: headers");
    let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
    assert_eq!(body, expected["body"], "{name}: body");
}

fn simulated_response(sim: &Value) -> HttpResponse {
    HttpResponse {
        status: u16::try_from(sim["status"].as_u64().unwrap()).unwrap(),
        headers: pairs(&sim["headers"]),
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

/// Compare an error against `{"error": kind, ...}`.
fn assert_error(name: &str, err: &ApiError, expected: &Value) {
    match (expected["error"].as_str().unwrap(), err) {
        ("non_success", ApiError::NonSuccessStatus { status, message, code }) => {
            assert_eq!(u64::from(*status), expected["status"].as_u64().unwrap(), "{name}: status");
            assert_eq!(message, expected["message"].as_str().unwrap(), "{name}: message");
            assert_eq!(code.as_deref(), expected["code"].as_str(), "{name}: code");
        }
        ("empty_response", ApiError::EmptyResponse(field)) => {
            assert_eq!(*field, expected["field"].as_str().unwrap(), "{name}: field");
        }
        (kind, other) => panic!("{name}: expected {kind}, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Request token
// ---------------------------------------------------------------------------

#[test]
fn request_token_test_vectors() {
    let vectors = load(include_str!("../../test-vectors/request_token.json"));
    let c = client(&vectors);

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let redirect_uri = case["input"]["redirect_uri"].as_str().unwrap();

        let req = c.build_request_token(redirect_uri).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_request_token(simulated_response(&case["simulated_response"]));
        let expected = &case["expected_result"];
        match result {
            Ok(token) => assert_eq!(token, expected["ok"].as_str().unwrap(), "{name}: token"),
            Err(err) => assert_error(name, &err, expected),
        }
    }
}

// ---------------------------------------------------------------------------
// Authorize
// ---------------------------------------------------------------------------

#[test]
fn authorize_test_vectors() {
    let vectors = load(include_str!("../../test-vectors/authorize.json"));
    let c = client(&vectors);

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let request_token = case["input"]["request_token"].as_str().unwrap();

        let req = c.build_authorize(request_token).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_authorize(simulated_response(&case["simulated_response"]));
        let expected = &case["expected_result"];
        match result {
            Ok(authorized) => {
                let want: AuthorizeResult = serde_json::from_value(expected["ok"].clone()).unwrap();
                assert_eq!(authorized, want, "{name}: result");
            }
            Err(err) => assert_error(name, &err, expected),
        }
    }
}

// ---------------------------------------------------------------------------
// Add
// ---------------------------------------------------------------------------

#[test]
fn add_test_vectors() {
    let vectors = load(include_str!("../../test-vectors/add.json"));
    let c = client(&vectors);

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input: AddInput = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_add(&input).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_add(simulated_response(&case["simulated_response"]));
        let expected = &case["expected_result"];
        match result {
            Ok(()) => assert!(expected.get("error").is_none(), "{name}: expected an error"),
            Err(err) => assert_error(name, &err, expected),
        }
    }
}
