//! User API

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::require_admin;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    // Any signed-in user
    let self_routes = Router::new().route(
        "/users/profile",
        get(handler::get_profile).put(handler::update_profile),
    );

    let admin_routes = Router::new()
        .route("/users", get(handler::list).post(handler::create))
        .route("/users/{id}", put(handler::update).delete(handler::delete))
        .route("/users/{id}/permissions", put(handler::set_permissions))
        .layer(middleware::from_fn(require_admin));

    self_routes.merge(admin_routes)
}
