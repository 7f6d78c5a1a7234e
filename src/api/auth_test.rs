use reqwest::Method;
use serde_json::json;

use super::*;
use crate::error::ApiError;
use crate::net::transport::RequestBody;
use crate::test_support::{Harness, auth_response_json, user_json};

fn api(harness: &Harness) -> AuthApi {
    AuthApi::new(harness.http.clone())
}

#[tokio::test]
async fn login_posts_credentials_and_unwraps_data() {
    let h = Harness::new();
    h.transport.ok(auth_response_json(1, "ann", "tok-a", "tok-r"));

    let credentials = LoginRequest { username: "ann".into(), password: "secret1".into() };
    let response = api(&h).login(&credentials).await.unwrap();

    assert_eq!(response.user.username, "ann");
    assert_eq!(response.tokens.access_token, "tok-a");
    let sent = h.transport.last_request();
    assert_eq!(sent.method, Method::POST);
    assert_eq!(sent.url, "http://api.test/api/v1/auth/login");
    assert_eq!(sent.body, RequestBody::Json(json!({ "username": "ann", "password": "secret1" })));
    assert!(sent.header("authorization").is_none());
}

#[tokio::test]
async fn register_sends_confirmation() {
    let h = Harness::new();
    h.transport.ok(auth_response_json(2, "bob", "a", "r"));

    let data = RegisterRequest {
        username: "bob".into(),
        email: "bob@example.com".into(),
        password: "secret1".into(),
        confirm_password: "secret1".into(),
    };
    api(&h).register(&data).await.unwrap();

    let RequestBody::Json(body) = h.transport.last_request().body else {
        panic!("expected JSON body");
    };
    assert_eq!(body["confirm_password"], "secret1");
}

#[tokio::test]
async fn me_unwraps_nested_user() {
    let h = Harness::logged_in();
    h.transport.ok(json!({ "user": user_json(1, "ann") }));

    let user = api(&h).me().await.unwrap();

    assert_eq!(user.id, 1);
    let sent = h.transport.last_request();
    assert_eq!(sent.method, Method::GET);
    assert_eq!(sent.header("Authorization"), Some("Bearer tok-a"));
}

#[tokio::test]
async fn refresh_sends_refresh_token() {
    let h = Harness::logged_in();
    h.transport.ok(json!({ "access_token": "tok-b", "expires_in": 3600 }));

    let refreshed = api(&h).refresh("tok-r").await.unwrap();

    assert_eq!(refreshed.access_token, "tok-b");
    assert_eq!(h.transport.last_request().body, RequestBody::Json(json!({ "refresh_token": "tok-r" })));
}

#[tokio::test]
async fn check_username_reads_availability() {
    let h = Harness::new();
    h.transport.ok(json!({ "available": false }));
    assert!(!api(&h).check_username("admin").await.unwrap());
    assert_eq!(h.transport.last_request().url, "http://api.test/api/v1/auth/check-username");
}

#[tokio::test]
async fn update_profile_uses_put() {
    let h = Harness::logged_in();
    let mut updated = user_json(1, "ann");
    updated["bio"] = json!("hello");
    h.transport.ok(json!({ "user": updated }));

    let update = ProfileUpdate { bio: Some("hello".into()), ..ProfileUpdate::default() };
    let user = api(&h).update_profile(&update).await.unwrap();

    assert_eq!(user.bio.as_deref(), Some("hello"));
    let sent = h.transport.last_request();
    assert_eq!(sent.method, Method::PUT);
    assert_eq!(sent.body, RequestBody::Json(json!({ "bio": "hello" })));
}

#[tokio::test]
async fn login_without_data_is_missing_data() {
    let h = Harness::new();
    h.transport.respond(200, json!({ "success": true, "message": "ok" }));
    let credentials = LoginRequest { username: "ann".into(), password: "x".into() };
    let err = api(&h).login(&credentials).await.unwrap_err();
    assert!(matches!(err, ApiError::MissingData));
}
