//! User API Handlers

use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    PermissionsUpdate, ProfileUpdate, UserCreate, UserRole, UserSummary, UserUpdate,
};

use crate::api::extract::{ApiJson, IdPath};
use crate::auth::{CurrentUser, permissions};
use crate::db;
use crate::db::users::{NewUser, UserChanges};
use crate::error::ServiceResult;
use crate::security_log;
use crate::state::AppState;
use crate::util::{hash_password, non_blank, verify_password};

fn parse_role(raw: &str) -> Result<UserRole, AppError> {
    UserRole::parse(raw.trim()).ok_or_else(|| {
        AppError::with_message(ErrorCode::InvalidRole, r#"Invalid role. Must be "admin" or "staff""#)
            .with_detail("role", raw)
    })
}

fn hash(password: &str) -> Result<String, AppError> {
    hash_password(password).map_err(|e| {
        tracing::error!(error = %e, "Password hashing failed");
        AppError::new(ErrorCode::InternalError)
    })
}

fn email_taken() -> AppError {
    AppError::with_message(ErrorCode::EmailInUse, "Email already in use by another user")
}

/// GET /users
pub async fn list(State(state): State<AppState>) -> ServiceResult<Json<Vec<UserSummary>>> {
    Ok(Json(db::users::list(&state.pool).await?))
}

/// POST /users
pub async fn create(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ApiJson(payload): ApiJson<UserCreate>,
) -> ServiceResult<(StatusCode, Json<Value>)> {
    let (Some(username), Some(password), Some(role)) = (
        non_blank(payload.username),
        payload.password.filter(|p| !p.is_empty()),
        non_blank(payload.role),
    ) else {
        return Err(AppError::required("Username, password, and role are required").into());
    };
    let role = parse_role(&role)?;
    let permissions = payload.permissions.unwrap_or_default();
    validate_permissions(&permissions)?;

    let password_hash = hash(&password)?;
    let full_name = non_blank(payload.full_name).unwrap_or_default();
    let email = non_blank(payload.email).unwrap_or_default();

    let user = db::users::create(
        &state.pool,
        NewUser {
            username: &username,
            password_hash: &password_hash,
            role,
            full_name: &full_name,
            email: &email,
            permissions: &permissions,
        },
    )
    .await?;

    security_log!(
        "INFO",
        "user_created",
        operator_id = current_user.id,
        user_id = user.id,
        role = user.role.clone()
    );
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully", "user": user })),
    ))
}

/// PUT /users/:id
pub async fn update(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ApiJson(payload): ApiJson<UserUpdate>,
) -> ServiceResult<Json<Value>> {
    let role = payload.role.as_deref().map(parse_role).transpose()?;
    let email = non_blank(payload.email);
    if let Some(email) = &email {
        if db::users::email_in_use(&state.pool, email, id).await? {
            return Err(email_taken().into());
        }
    }
    let full_name = non_blank(payload.full_name);
    let password_hash = payload
        .password
        .filter(|p| !p.is_empty())
        .map(|p| hash(&p))
        .transpose()?;

    let user = db::users::update(
        &state.pool,
        id,
        UserChanges {
            full_name: full_name.as_deref(),
            email: email.as_deref(),
            role,
            password_hash: password_hash.as_deref(),
        },
    )
    .await?
    .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    Ok(Json(json!({ "message": "User updated successfully", "user": user })))
}

/// DELETE /users/:id
pub async fn delete(
    State(state): State<AppState>,
    current_user: CurrentUser,
    IdPath(id): IdPath,
) -> ServiceResult<Json<Value>> {
    if !db::users::delete(&state.pool, id).await? {
        return Err(AppError::new(ErrorCode::UserNotFound).into());
    }

    security_log!("INFO", "user_deleted", operator_id = current_user.id, user_id = id);
    Ok(Json(json!({ "message": "User deleted successfully" })))
}

fn validate_permissions(perms: &[String]) -> Result<(), AppError> {
    match perms.iter().find(|p| !permissions::is_valid_permission(p)) {
        Some(unknown) => Err(AppError::with_message(
            ErrorCode::PermissionsInvalid,
            format!("Unknown permission: {unknown}"),
        )
        .with_detail("allowed", permissions::ALL_PERMISSIONS.to_vec())),
        None => Ok(()),
    }
}

/// PUT /users/:id/permissions
///
/// Takes effect on the user's next request; identity is reloaded per request.
pub async fn set_permissions(
    State(state): State<AppState>,
    current_user: CurrentUser,
    IdPath(id): IdPath,
    ApiJson(payload): ApiJson<PermissionsUpdate>,
) -> ServiceResult<Json<Value>> {
    let permissions: Vec<String> = payload
        .permissions
        .and_then(|v| serde_json::from_value(v).ok())
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::PermissionsInvalid, "Permissions must be an array of strings.")
        })?;
    validate_permissions(&permissions)?;

    let user = db::users::set_permissions(&state.pool, id, &permissions)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::UserNotFound, "User not found."))?;

    security_log!(
        "INFO",
        "permissions_changed",
        operator_id = current_user.id,
        user_id = id,
        permissions = permissions.join(",")
    );
    Ok(Json(json!({
        "message": "User permissions updated successfully.",
        "user": user,
    })))
}

/// GET /users/profile
pub async fn get_profile(State(state): State<AppState>, current_user: CurrentUser) -> ServiceResult<Json<Value>> {
    let user = db::users::profile(&state.pool, current_user.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    Ok(Json(json!({ "user": user })))
}

/// PUT /users/profile
///
/// A password change needs both `current_password` and `new_password`.
pub async fn update_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ApiJson(payload): ApiJson<ProfileUpdate>,
) -> ServiceResult<Json<Value>> {
    let email = non_blank(payload.email);
    if let Some(email) = &email {
        if db::users::email_in_use(&state.pool, email, current_user.id).await? {
            return Err(email_taken().into());
        }
    }

    let new_hash = match (
        payload.current_password.filter(|p| !p.is_empty()),
        payload.new_password.filter(|p| !p.is_empty()),
    ) {
        (Some(current), Some(new)) => {
            let stored = db::users::password_hash(&state.pool, current_user.id)
                .await?
                .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
            if !verify_password(&current, &stored) {
                security_log!("WARN", "password_change_rejected", user_id = current_user.id);
                return Err(AppError::new(ErrorCode::CurrentPasswordIncorrect).into());
            }
            Some(hash(&new)?)
        }
        _ => None,
    };

    let full_name = non_blank(payload.full_name);
    let user = db::users::update_profile(
        &state.pool,
        current_user.id,
        full_name.as_deref(),
        email.as_deref(),
        new_hash.as_deref(),
    )
    .await?
    .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    Ok(Json(json!({ "message": "Profile updated successfully", "user": user })))
}
