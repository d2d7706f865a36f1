//! Student API

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::{permissions, require_admin, require_permission};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    let student_routes = Router::new()
        .route("/students", get(handler::list).post(handler::create))
        .route("/students/active", get(handler::list_active))
        .route("/students/expired", get(handler::list_expired))
        .route("/students/expiring-soon", get(handler::list_expiring_soon))
        .route("/students/inactive", get(handler::list_inactive))
        .route("/students/shift/{shift_id}", get(handler::list_by_shift))
        .route(
            "/students/{id}",
            get(handler::get_by_id).put(handler::update).delete(handler::delete),
        )
        .route("/students/{id}/renew", put(handler::renew).post(handler::renew))
        .route("/students/{id}/status", put(handler::set_status))
        .layer(middleware::from_fn(require_permission(permissions::STUDENTS)));

    let admin_routes = Router::new()
        .route("/students/stats/dashboard", get(handler::dashboard))
        .layer(middleware::from_fn(require_admin));

    student_routes.merge(admin_routes)
}
