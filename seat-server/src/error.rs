//! Unified service-layer error type
//!
//! `ServiceError` bridges DB-layer errors (`sqlx::Error`, `BoxError`) and the
//! API-layer error (`AppError`), so handlers and transactional DB code can mix
//! both with `?`.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};
use std::sync::atomic::{AtomicBool, Ordering};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

static EXPOSE_DETAILS: AtomicBool = AtomicBool::new(false);

/// Echo the raw cause of internal errors under `details.error`.
pub fn set_expose_details(enabled: bool) {
    EXPOSE_DETAILS.store(enabled, Ordering::Relaxed);
}

/// Service-layer error, two variants:
///
/// - `Db`: Database/infrastructure errors (logged, answered with a generic 500)
/// - `App`: Business-rule errors (passed through to the client)
#[derive(Debug)]
pub enum ServiceError {
    Db(BoxError),
    App(AppError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                let err = AppError::new(ErrorCode::InternalError);
                if EXPOSE_DETAILS.load(Ordering::Relaxed) {
                    err.with_detail("error", db_err.to_string())
                } else {
                    err
                }
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Convenience type alias for service-layer results
pub type ServiceResult<T> = Result<T, ServiceError>;

/// True when `err` is a PostgreSQL unique violation on `constraint`
pub fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            db.code().as_deref() == Some("23505") && db.constraint() == Some(constraint)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn app_errors_pass_through() {
        let err: AppError = ServiceError::from(AppError::new(ErrorCode::SeatAlreadyAssigned)).into();
        assert_eq!(err.code, ErrorCode::SeatAlreadyAssigned);
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn db_errors_become_generic_500() {
        set_expose_details(false);
        let err: AppError = ServiceError::from(sqlx::Error::RowNotFound).into();
        assert_eq!(err.code, ErrorCode::InternalError);
        assert_eq!(err.message, "Server error");
        assert_eq!(err.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn non_database_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(
            &sqlx::Error::RowNotFound,
            "seat_assignments_seat_shift_uniq"
        ));
    }
}
