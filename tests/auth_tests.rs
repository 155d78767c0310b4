use axum::{
    Extension, Json, Router,
    body::Body,
    http::{Request, StatusCode, header},
    middleware,
    routing::get,
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use motofleet::api::auth::auth_middleware;
use motofleet::api::{AppState, AuthenticatedUser};
use motofleet::config::Config;
use motofleet::db::UserFields;
use motofleet::entities::roles;
use motofleet::services::password;
use std::sync::Arc;
use tower::ServiceExt;

const SIGNING_KEY: &str = "integration-test-signing-key-0123456789";

async fn spawn_app() -> (Router, Arc<AppState>) {
    let mut config = Config::default();
    config.general.database_url = "sqlite::memory:".to_string();
    config.jwt.key = SIGNING_KEY.to_string();
    config.security.bcrypt_cost = 4;

    let state = motofleet::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    (motofleet::api::router(state.clone()), state)
}

async fn add_user(state: &AppState, username: &str, plaintext: &str, role_id: i32) -> i32 {
    state
        .store()
        .create_user(UserFields {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: password::hash(plaintext, 4).unwrap(),
            role_id,
        })
        .await
        .unwrap()
        .id
}

async fn post_login(app: &Router, username: &str, plaintext: &str) -> (StatusCode, serde_json::Value) {
    let body = serde_json::json!({ "username": username, "password": plaintext });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/login")
                .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or_default())
}

async fn get_with_token(app: &Router, uri: &str, token: Option<&str>) -> StatusCode {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn test_login_returns_token_with_stored_identity() {
    let (app, state) = spawn_app().await;
    let alice_id = add_user(&state, "alice", "secret1", 2).await;

    let (status, body) = post_login(&app, "alice", "secret1").await;
    assert_eq!(status, StatusCode::OK);

    let token = body["token"].as_str().unwrap();
    let claims = state.tokens.validate(token).unwrap();
    assert_eq!(claims.user_id(), Some(alice_id));
    assert_eq!(claims.name, "alice");
    assert_eq!(claims.role, "USER");
    assert!(!claims.jti.is_empty());
}

#[tokio::test]
async fn test_wrong_password_matches_unknown_user() {
    let (app, state) = spawn_app().await;
    add_user(&state, "alice", "secret1", 2).await;

    let (wrong_status, wrong_body) = post_login(&app, "alice", "wrong").await;
    let (unknown_status, unknown_body) = post_login(&app, "nobody", "secret1").await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["error"], "Invalid username or password");
    assert!(wrong_body.get("token").is_none());
}

#[tokio::test]
async fn test_inactive_role_has_no_access_profile() {
    let (app, state) = spawn_app().await;
    add_user(&state, "bob", "secret1", 2).await;
    state.store().soft_delete::<roles::Entity>(2).await.unwrap();

    let (status, body) = post_login(&app, "bob", "secret1").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "User has no valid access profile");
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn test_deactivated_user_cannot_log_in() {
    let (app, state) = spawn_app().await;
    let id = add_user(&state, "carol", "secret1", 1).await;
    state
        .store()
        .soft_delete::<motofleet::entities::users::Entity>(id)
        .await
        .unwrap();

    let (status, body) = post_login(&app, "carol", "secret1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid username or password");
}

#[tokio::test]
async fn test_login_requires_both_fields() {
    let (app, _) = spawn_app().await;

    let (status, _) = post_login(&app, "", "secret1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_login(&app, "alice", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_protected_routes_require_valid_token() {
    let (app, state) = spawn_app().await;
    add_user(&state, "alice", "secret1", 2).await;

    for uri in ["/api/v1/motorcycles", "/api/v1/users", "/api/v1/roles/1", "/api/v1/metrics"] {
        assert_eq!(get_with_token(&app, uri, None).await, StatusCode::UNAUTHORIZED);
    }

    assert_eq!(
        get_with_token(&app, "/api/v1/motorcycles", Some("garbage")).await,
        StatusCode::UNAUTHORIZED
    );

    let (_, body) = post_login(&app, "alice", "secret1").await;
    let token = body["token"].as_str().unwrap();
    assert_eq!(
        get_with_token(&app, "/api/v1/motorcycles", Some(token)).await,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let (app, state) = spawn_app().await;
    let id = add_user(&state, "alice", "secret1", 2).await;

    let stale = state
        .tokens
        .issue_at(id, "alice", "USER", Utc::now() - Duration::hours(2))
        .unwrap();

    assert_eq!(
        get_with_token(&app, "/api/v1/roles", Some(&stale.token)).await,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_token_from_another_key_is_rejected() {
    let (app, _) = spawn_app().await;

    let mut other = Config::default().jwt;
    other.key = "a-completely-different-signing-key!!".to_string();
    let forged = motofleet::services::TokenService::new(&other)
        .issue(1, "mallory", "ADMIN")
        .unwrap();

    assert_eq!(
        get_with_token(&app, "/api/v1/users", Some(&forged.token)).await,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_middleware_exposes_token_identity() {
    let (app, state) = spawn_app().await;
    let id = add_user(&state, "alice", "secret1", 2).await;

    let whoami = Router::new()
        .route(
            "/whoami",
            get(|Extension(user): Extension<AuthenticatedUser>| async move {
                Json(serde_json::json!({
                    "id": user.id,
                    "username": user.username,
                    "role": user.role,
                }))
            }),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state);

    let (_, body) = post_login(&app, "alice", "secret1").await;
    let token = body["token"].as_str().unwrap();

    let response = whoami
        .oneshot(
            Request::builder()
                .uri("/whoami")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let identity: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(identity["id"], id);
    assert_eq!(identity["username"], "alice");
    assert_eq!(identity["role"], "USER");
}
