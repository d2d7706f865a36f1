//! Login handler

use axum::{Json, extract::State};
use shared::error::{AppError, ErrorCode};
use shared::models::{LoginRequest, LoginResponse};

use crate::api::extract::ApiJson;
use crate::db;
use crate::error::ServiceResult;
use crate::security_log;
use crate::state::AppState;
use crate::util::verify_password;

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ServiceResult<Json<LoginResponse>> {
    let username = req.username.trim();
    if username.is_empty() || req.password.is_empty() {
        return Err(AppError::required("Username and password are required").into());
    }

    let credentials = db::users::find_credentials(&state.pool, username).await?;

    let Some(credentials) = credentials.filter(|c| verify_password(&req.password, &c.password_hash)) else {
        security_log!("WARN", "login_failed", username = username.to_string());
        return Err(AppError::invalid_credentials().into());
    };

    let user = credentials.summary();
    let token = state.jwt.generate_token(&user).map_err(|e| {
        tracing::error!(error = %e, "Token generation failed");
        AppError::new(ErrorCode::InternalError)
    })?;

    security_log!("INFO", "login_success", user_id = user.id, username = user.username.clone());
    Ok(Json(LoginResponse { token, user }))
}
