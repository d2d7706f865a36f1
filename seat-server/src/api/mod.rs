//! HTTP API
//!
//! - [`health`] - liveness check (public)
//! - [`auth`] - login (public)
//! - [`branches`] - branch registry (`branches` capability)
//! - [`students`] - students, renewals, dashboard (`students` / admin)
//! - [`collections`] - collections report and settlement (`collections` / admin)
//! - [`users`] - accounts and profile (admin / any user)

pub mod extract;
pub mod query;

pub mod auth;
pub mod branches;
pub mod collections;
pub mod health;
pub mod students;
pub mod users;

use axum::Router;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::require_auth;
use crate::middleware;
use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// uuid v4 request ids
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// All routes, with authentication and capability gates but no outer middleware
pub fn build_router(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .merge(branches::router())
        .merge(students::router())
        .merge(collections::router())
        .merge(users::router())
        .layer(axum_middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(protected)
}

/// Fully configured application, used by the server and by tests
pub fn build_app(state: AppState) -> Router {
    build_router(&state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(REQUEST_ID_HEADER)))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        .with_state(state)
}
