mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use senbox_api::auth::Role;
use senbox_api::router;

async fn send(app: Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn root_is_public() {
    let app = router(common::offline_state());
    let (status, body) = send(app, Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = router(common::offline_state());
    let (status, body) = send(app, Method::GET, "/api/components/keys", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let app = router(common::offline_state());
    let (status, _) = send(app, Method::GET, "/api/auth/whoami", Some("abc.def.ghi"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn whoami_echoes_token_identity() {
    let state = common::offline_state();
    let token = common::token_for(&state, Role::Device);

    let (status, body) = send(router(state), Method::GET, "/api/auth/whoami", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "device");
    assert_eq!(body["data"]["kind"], "user");
}

#[tokio::test]
async fn mutations_need_admin_role() {
    let state = common::offline_state();
    let token = common::token_for(&state, Role::User);

    let payload = json!({ "type": "label", "name": "Hello", "value": { "text": "hi" } });
    let (status, body) = send(router(state), Method::POST, "/api/components", Some(&token), Some(payload)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn unknown_component_type_is_rejected_before_storage() {
    let state = common::offline_state();
    let token = common::token_for(&state, Role::Admin);

    let payload = json!({ "type": "carousel", "name": "Spin", "value": {} });
    let (status, body) = send(router(state), Method::POST, "/api/components", Some(&token), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "UNKNOWN_COMPONENT_TYPE");
}

#[tokio::test]
async fn invalid_component_value_names_the_field() {
    let state = common::offline_state();
    let token = common::token_for(&state, Role::SuperAdmin);

    let payload = json!({ "type": "button_url", "name": "Docs", "value": { "url": "ftp://example.com" } });
    let (status, body) = send(router(state), Method::POST, "/api/components", Some(&token), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["url"].is_string());
}

#[tokio::test]
async fn unknown_scope_is_a_bad_request() {
    let state = common::offline_state();
    let token = common::token_for(&state, Role::User);

    let (status, body) = send(router(state), Method::GET, "/api/menus/janitor", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("janitor"));
}

#[tokio::test]
async fn scope_key_shape_is_checked_before_storage() {
    let state = common::offline_state();
    let token = common::token_for(&state, Role::User);

    // device menus are keyed by owner_id
    let (status, body) = send(router(state), Method::GET, "/api/menus/device", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_SCOPE_KEY");
}

#[tokio::test]
async fn single_item_lookup_checks_the_scope_key() {
    let state = common::offline_state();
    let token = common::token_for(&state, Role::User);

    let uri = format!("/api/menus/org_device/items/{}?owner_id={}", uuid::Uuid::new_v4(), uuid::Uuid::new_v4());
    let (status, body) = send(router(state), Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_SCOPE_KEY");
}

#[tokio::test]
async fn malformed_component_id_is_a_bad_request() {
    let state = common::offline_state();
    let token = common::token_for(&state, Role::User);

    let (status, _) = send(router(state), Method::GET, "/api/components/not-a-uuid", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
