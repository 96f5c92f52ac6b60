mod common;

use actix_web::http::StatusCode;
use actix_web::middleware::Logger;
use actix_web::{rt, test, App, HttpServer};
use chrono::Duration;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::net::TcpListener;

use common::{bearer, login, register_and_login, signup, test_state, TEST_SECRET};
use tasky::auth::TokenService;
use tasky::routes;

#[test_log::test(actix_rt::test)]
async fn test_signup_and_login_flow() {
    let app = test::init_service(
        App::new()
            .wrap(Logger::default())
            .configure(routes::config(test_state(&[]))),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/signup")
        .set_json(json!({ "username": "alice", "password": "secret1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "username": "alice" }));

    // Same username again
    assert_eq!(signup(&app, "alice", "different1").await, StatusCode::CONFLICT);

    let (status, body) = login(&app, "alice", "secret1").await;
    assert_eq!(status, StatusCode::OK, "Login failed. Body: {}", body);
    assert_eq!(body["token_type"], "Bearer");
    assert!(body["expires_at"].is_string());
    let token = body["token"].as_str().unwrap();
    assert!(!token.is_empty(), "Token should be a non-empty string");

    let req = test::TestRequest::get()
        .uri("/todo")
        .append_header(bearer(token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let whoami: Value = test::read_body_json(resp).await;
    assert_eq!(whoami["username"], "alice");
    assert!(whoami["expires_at"].is_string());
}

#[actix_rt::test]
async fn test_invalid_signup_inputs() {
    let app = test::init_service(App::new().configure(routes::config(test_state(&[])))).await;

    let test_cases = vec![
        (json!({ "password": "secret1" }), "missing username"),
        (json!({ "username": "alice" }), "missing password"),
        (json!({ "username": "", "password": "secret1" }), "empty username"),
        (json!({ "username": "user name!", "password": "secret1" }), "username with invalid chars"),
        (json!({ "username": "a".repeat(65), "password": "secret1" }), "username too long"),
        (json!({ "username": "alice", "password": "123" }), "password too short"),
        (json!({ "username": "alice", "password": "p".repeat(73) }), "password too long"),
        (json!("alice:secret1"), "wrong body shape"),
    ];

    for (payload, description) in test_cases {
        let req = test::TestRequest::post()
            .uri("/signup")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;

        assert_eq!(
            status,
            StatusCode::BAD_REQUEST,
            "Test case failed: {}. Body: {}",
            description,
            body
        );
        assert!(body["error"].is_string(), "{}: error body missing", description);
    }

    // Nothing above created an account.
    let (status, _) = login(&app, "alice", "secret1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_min_password_length_is_configurable() {
    let app = test::init_service(
        App::new().configure(routes::config(test_state(&[("MIN_PASSWORD_LENGTH", "10")]))),
    )
    .await;

    assert_eq!(signup(&app, "alice", "secret1").await, StatusCode::BAD_REQUEST);
    assert_eq!(signup(&app, "alice", "longer-secret").await, StatusCode::CREATED);
}

#[actix_rt::test]
async fn test_login_failures_do_not_reveal_accounts() {
    let app = test::init_service(App::new().configure(routes::config(test_state(&[])))).await;
    assert_eq!(signup(&app, "alice", "secret1").await, StatusCode::CREATED);

    let (wrong_status, wrong_body) = login(&app, "alice", "wrong").await;
    let (unknown_status, unknown_body) = login(&app, "mallory", "secret1").await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
    assert!(wrong_body.get("token").is_none());
}

#[actix_rt::test]
async fn test_login_rejects_password_beyond_bcrypt_limit() {
    let app = test::init_service(App::new().configure(routes::config(test_state(&[])))).await;
    let password = "p".repeat(72);
    assert_eq!(signup(&app, "alice", &password).await, StatusCode::CREATED);

    let (status, _) = login(&app, "alice", &password).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = login(&app, "alice", &format!("{}WRONG-SUFFIX", password)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.get("token").is_none());
}

#[actix_rt::test]
async fn test_bearer_scheme_is_case_insensitive() {
    let app = test::init_service(App::new().configure(routes::config(test_state(&[])))).await;
    let token = register_and_login(&app, "alice", "secret1").await;

    let req = test::TestRequest::get()
        .uri("/todo")
        .append_header(("Authorization", format!("bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_unknown_routes_are_not_unauthorized() {
    let app = test::init_service(App::new().configure(routes::config(test_state(&[])))).await;

    let req = test::TestRequest::get().uri("/no-such-route").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/signup").to_request();
    let resp = test::call_service(&app, req).await;
    assert_ne!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_whoami_rejects_bad_tokens() {
    let app = test::init_service(App::new().configure(routes::config(test_state(&[])))).await;
    let valid = register_and_login(&app, "alice", "secret1").await;

    let same_secret = TokenService::new(TEST_SECRET, Duration::hours(1));
    let expired = same_secret.issue("alice", Duration::seconds(-30)).unwrap();
    let foreign = TokenService::new("someone-elses-secret", Duration::hours(1))
        .issue("alice", Duration::hours(1))
        .unwrap();

    let cases: Vec<(Option<String>, &str)> = vec![
        (None, "no header"),
        (Some("Bearer".to_string()), "empty bearer"),
        (Some(format!("Basic {}", valid)), "wrong scheme"),
        (Some("Bearer not.a.jwt".to_string()), "garbage token"),
        (Some(format!("Bearer {}", expired)), "expired token"),
        (Some(format!("Bearer {}", foreign)), "foreign signature"),
    ];

    let mut token_bodies = Vec::new();
    for (header, description) in cases {
        let mut req = test::TestRequest::get().uri("/todo");
        if let Some(value) = header {
            req = req.append_header(("Authorization", value));
        }
        let resp = test::call_service(&app, req.to_request()).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}: {}", description, body);
        if description.ends_with("token") || description.ends_with("signature") {
            token_bodies.push(body);
        }
    }

    // Expired, tampered and foreign tokens are indistinguishable to the client.
    assert!(token_bodies.windows(2).all(|pair| pair[0] == pair[1]));
}

#[actix_rt::test]
async fn test_protected_route_unauthorized_over_http() {
    let state = test_state(&[]);

    // Find an available port
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(routes::config(state.clone()))
    })
    .workers(1)
    .bind(("127.0.0.1", port))
    .unwrap_or_else(|_| panic!("Failed to bind to port {}", port))
    .run();
    let handle = server.handle();
    rt::spawn(server);

    // Give the server a moment to start
    tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://127.0.0.1:{}/todo/alice", port))
        .json(&json!({ "content": "Unauthorized todo" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.expect("error body should be JSON");
    assert_eq!(body["error"], "missing bearer token");

    handle.stop(false).await;
}
