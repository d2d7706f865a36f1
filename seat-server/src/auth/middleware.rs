//! Authentication middleware
//!
//! Axum middleware for JWT authentication and capability checks.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::{AppError, ErrorCode};

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::db;
use crate::error::ServiceError;
use crate::security_log;
use crate::state::AppState;

/// Authentication middleware - requires a signed-in user
///
/// Validates `Authorization: Bearer <token>`, then reloads the user so role
/// and permission changes apply to the very next request. On success a
/// [`CurrentUser`] is inserted into the request extensions.
///
/// | Failure | Code |
/// |---------|------|
/// | No Authorization header | 401 NotAuthenticated |
/// | Token expired | 401 TokenExpired |
/// | Bad token / deleted user | 401 TokenInvalid |
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // CORS preflight
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = req.uri().path().to_string());
            return Err(AppError::not_authenticated());
        }
    };

    let verified = state
        .jwt
        .validate_token(token)
        .and_then(|claims| claims.user_id().map(|id| (id, claims.username)));
    let (user_id, username) = match verified {
        Ok(ok) => ok,
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = e.to_string(),
                uri = req.uri().path().to_string()
            );
            return Err(match e {
                JwtError::ExpiredToken => AppError::token_expired(),
                _ => AppError::invalid_token("Invalid token"),
            });
        }
    };

    let Some(user) = db::users::find_summary(&state.pool, user_id)
        .await
        .map_err(ServiceError::from)?
    else {
        security_log!(
            "WARN",
            "auth_user_gone",
            user_id = user_id,
            username = username
        );
        return Err(AppError::invalid_token("User no longer exists"));
    };

    let user = CurrentUser::from(user);
    req.extensions_mut().insert(user.clone());
    let mut response = next.run(req).await;
    response.extensions_mut().insert(user);
    Ok(response)
}

/// Capability middleware - requires `permission`
///
/// ```ignore
/// Router::new()
///     .route("/branches", post(create))
///     .layer(middleware::from_fn(require_permission(permissions::BRANCHES)));
/// ```
///
/// Missing capability → 403.
pub fn require_permission(
    permission: &'static str,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or_else(AppError::not_authenticated)?;

            if !user.has_permission(permission) {
                security_log!(
                    "WARN",
                    "permission_denied",
                    user_id = user.id,
                    username = user.username.clone(),
                    required_permission = permission
                );
                return Err(AppError::permission_denied(format!(
                    "Permission denied: {}",
                    permission
                )));
            }

            Ok(next.run(req).await)
        })
    }
}

/// Admin middleware - requires `role == "admin"`
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(AppError::not_authenticated)?;
    if !user.is_admin() {
        security_log!(
            "WARN",
            "admin_required",
            user_id = user.id,
            username = user.username.clone(),
            user_role = user.role.clone()
        );
        return Err(AppError::new(ErrorCode::AdminRequired));
    }

    Ok(next.run(req).await)
}
