//! Collections API

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::{permissions, require_admin, require_permission};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    let read_routes = Router::new()
        .route("/collections", get(handler::list))
        .layer(middleware::from_fn(require_permission(permissions::COLLECTIONS)));

    let settle_routes = Router::new()
        .route("/collections/{history_id}", put(handler::settle))
        .layer(middleware::from_fn(require_admin));

    read_routes.merge(settle_routes)
}
