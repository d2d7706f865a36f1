//! Router-level tests that never reach PostgreSQL
//!
//! The pool is lazy; every request here is answered by middleware or input
//! validation before a query would run.

use axum::Router;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use http::{StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use seat_server::api::extract::ApiQuery;
use seat_server::api::query::BranchQuery;
use seat_server::auth::{CurrentUser, JwtConfig, JwtService, require_admin, require_permission};
use seat_server::{AppState, Config, build_app};
use shared::models::UserSummary;

fn app() -> Router {
    let state = AppState::lazy(&Config::default()).unwrap();
    build_app(state)
}

async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get_request(uri: &str, authorization: Option<&str>) -> Request {
    let mut builder = Request::builder().uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

fn login_request(body: &str) -> Request {
    Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn staff(permissions: &[&str]) -> UserSummary {
    UserSummary {
        id: 7,
        username: "front-desk".into(),
        role: "staff".into(),
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
    }
}

#[tokio::test]
async fn health_is_public_and_tagged_with_request_id() {
    let response = app().oneshot(get_request("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(body_json(response).await, serde_json::json!({ "status": "ok" }));
}

#[tokio::test]
async fn incoming_request_id_is_echoed() {
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    for uri in ["/students", "/branches", "/collections", "/users", "/users/profile"] {
        let response = app().oneshot(get_request(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");

        let body = body_json(response).await;
        assert_eq!(body["code"], 1001, "{uri}");
        assert_eq!(body["message"], "Authentication required");
    }
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let response = app()
        .oneshot(get_request("/students", Some("Bearer not-a-jwt")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], 1004);
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn non_bearer_header_is_rejected() {
    let response = app()
        .oneshot(get_request("/branches", Some("Basic YWRtaW46YWRtaW4=")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Invalid authorization header");
}

#[tokio::test]
async fn token_from_another_secret_is_rejected() {
    let foreign = JwtService::with_config(JwtConfig {
        secret: "some-other-secret".into(),
        expiration_hours: 1,
        issuer: "seat-server".into(),
    });
    let token = foreign.generate_token(&staff(&["students"])).unwrap();

    let response = app()
        .oneshot(get_request("/students", Some(&format!("Bearer {token}"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], 1004);
}

#[tokio::test]
async fn expired_token_is_reported_as_expired() {
    let config = Config::default();
    let stale = JwtService::with_config(JwtConfig {
        expiration_hours: -2,
        ..JwtConfig::from_config(&config)
    });
    let token = stale.generate_token(&staff(&["students"])).unwrap();

    let response = app()
        .oneshot(get_request("/students/active", Some(&format!("Bearer {token}"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], 1003);
}

#[tokio::test]
async fn login_requires_username_and_password() {
    let response = app()
        .oneshot(login_request(r#"{"username":"   ","password":"x"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], 7);
    assert_eq!(body["message"], "Username and password are required");
}

#[tokio::test]
async fn login_rejects_malformed_json() {
    let response = app().oneshot(login_request("{\"username\":")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], 2);
}

async fn inject_user(State(user): State<CurrentUser>, mut req: Request, next: Next) -> Response {
    req.extensions_mut().insert(user);
    next.run(req).await
}

fn gated(user: CurrentUser) -> Router {
    let by_permission = Router::new()
        .route("/branches", get(|| async { "branches" }))
        .layer(middleware::from_fn(require_permission("branches")));
    let admin_only = Router::new()
        .route("/admin", get(|| async { "admin" }))
        .layer(middleware::from_fn(require_admin));

    Router::new()
        .merge(by_permission)
        .merge(admin_only)
        .layer(middleware::from_fn_with_state(user, inject_user))
}

#[tokio::test]
async fn missing_capability_is_forbidden() {
    let app = gated(CurrentUser::from(staff(&["students"])));

    let response = app.clone().oneshot(get_request("/branches", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["message"], "Permission denied: branches");

    let response = app.oneshot(get_request("/admin", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn granted_capability_passes() {
    let app = gated(CurrentUser::from(staff(&["branches"])));

    let response = app.oneshot(get_request("/branches", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn admins_pass_every_gate() {
    let admin = CurrentUser::from(UserSummary {
        role: "admin".into(),
        permissions: Vec::new(),
        ..staff(&[])
    });
    let app = gated(admin);

    for uri in ["/branches", "/admin"] {
        let response = app.clone().oneshot(get_request(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
    }
}

#[tokio::test]
async fn bad_query_string_gets_a_json_error() {
    let app = Router::new().route(
        "/filtered",
        get(|ApiQuery(q): ApiQuery<BranchQuery>| async move { q.branch_id.unwrap_or_default() }),
    );

    let response = app
        .clone()
        .oneshot(get_request("/filtered?branchId=1&branchId=2", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], 2);
    assert!(body["message"].as_str().unwrap().contains("branchId"));

    let response = app.oneshot(get_request("/filtered?branchId=4", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
