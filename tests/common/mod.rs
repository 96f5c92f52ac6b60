#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{json, Value};
use std::sync::Arc;

use tasky::store::MemoryStore;
use tasky::{AppState, Config};

pub const TEST_SECRET: &str = "integration-test-secret";

/// Test configuration: fixed secret, cheapest bcrypt cost, plus any overrides.
pub fn test_config(overrides: &[(&str, &str)]) -> Config {
    let mut vars: Vec<(String, String)> = vec![
        ("JWT_SECRET".to_string(), TEST_SECRET.to_string()),
        ("BCRYPT_COST".to_string(), "4".to_string()),
    ];
    vars.extend(overrides.iter().map(|(k, v)| (k.to_string(), v.to_string())));

    Config::from_vars(|key| {
        vars.iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    })
    .expect("test config must be valid")
}

/// Fresh state over an empty in-memory store.
pub fn test_state(overrides: &[(&str, &str)]) -> AppState {
    AppState::new(&test_config(overrides), Arc::new(MemoryStore::new()))
        .expect("failed to build app state")
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

pub async fn signup(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    username: &str,
    password: &str,
) -> StatusCode {
    let req = test::TestRequest::post()
        .uri("/signup")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    test::call_service(app, req).await.status()
}

/// Logs in and returns the status and parsed body.
pub async fn login(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    username: &str,
    password: &str,
) -> (StatusCode, Value) {
    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

/// Signs up `username` and returns a session token for it.
pub async fn register_and_login(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    username: &str,
    password: &str,
) -> String {
    assert_eq!(signup(app, username, password).await, StatusCode::CREATED);
    let (status, body) = login(app, username, password).await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["token"]
        .as_str()
        .expect("login response must carry a token")
        .to_string()
}
