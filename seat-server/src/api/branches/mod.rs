//! Branch API

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::{permissions, require_permission};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/branches", get(handler::list).post(handler::create))
        .route("/branches/{id}", put(handler::update).delete(handler::delete))
        .layer(middleware::from_fn(require_permission(permissions::BRANCHES)))
}
