//! User accounts

use shared::error::{AppError, ErrorCode};
use shared::models::{UserProfile, UserRole, UserSummary};
use sqlx::{PgConnection, PgPool};

use super::BoxError;
use crate::error::{ServiceError, ServiceResult, is_unique_violation};

const USERNAME_UNIQUE: &str = "users_username_key";

/// Row used by login; never serialized
#[derive(Debug, sqlx::FromRow)]
pub struct UserCredentials {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub permissions: Vec<String>,
}

impl UserCredentials {
    pub fn summary(self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username,
            role: self.role,
            permissions: self.permissions,
        }
    }
}

/// New account fields, already validated and hashed
#[derive(Debug)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub role: UserRole,
    pub full_name: &'a str,
    pub email: &'a str,
    pub permissions: &'a [String],
}

/// Admin edit of an account; `None` keeps the stored value
#[derive(Debug, Default)]
pub struct UserChanges<'a> {
    pub full_name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub role: Option<UserRole>,
    pub password_hash: Option<&'a str>,
}

pub async fn find_summary(pool: &PgPool, id: i64) -> Result<Option<UserSummary>, sqlx::Error> {
    sqlx::query_as("SELECT id, username, role, permissions FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_credentials(pool: &PgPool, username: &str) -> Result<Option<UserCredentials>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, username, password_hash, role, permissions FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await
}

pub async fn password_hash(pool: &PgPool, id: i64) -> Result<Option<String>, sqlx::Error> {
    let row: Option<(String,)> = sqlx::query_as("SELECT password_hash FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(hash,)| hash))
}

pub async fn list(pool: &PgPool) -> Result<Vec<UserSummary>, sqlx::Error> {
    sqlx::query_as("SELECT id, username, role, permissions FROM users ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn profile(pool: &PgPool, id: i64) -> Result<Option<UserProfile>, sqlx::Error> {
    sqlx::query_as("SELECT id, username, full_name, email, role FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// True if another account already uses `email`
pub async fn email_in_use(pool: &PgPool, email: &str, except_id: i64) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1 AND id <> $2 LIMIT 1")
        .bind(email)
        .bind(except_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

fn username_taken() -> AppError {
    AppError::new(ErrorCode::UsernameExists)
}

pub async fn create(pool: &PgPool, user: NewUser<'_>) -> ServiceResult<UserSummary> {
    let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE username = $1")
        .bind(user.username)
        .fetch_optional(pool)
        .await?;
    if existing.is_some() {
        return Err(username_taken().into());
    }

    let created = sqlx::query_as(
        r#"
        INSERT INTO users (username, password_hash, role, full_name, email, permissions)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, username, role, permissions
        "#,
    )
    .bind(user.username)
    .bind(user.password_hash)
    .bind(user.role.as_str())
    .bind(user.full_name)
    .bind(user.email)
    .bind(user.permissions)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e, USERNAME_UNIQUE) {
            ServiceError::from(username_taken())
        } else {
            ServiceError::from(e)
        }
    })?;
    Ok(created)
}

/// Lock admin rows and count them
async fn locked_admin_count(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
    let ids: Vec<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE role = 'admin' FOR UPDATE")
        .fetch_all(conn)
        .await?;
    Ok(ids.len() as i64)
}

fn last_admin(message: &str) -> AppError {
    AppError::with_message(ErrorCode::LastAdminRequired, message)
}

pub async fn update(pool: &PgPool, id: i64, changes: UserChanges<'_>) -> ServiceResult<Option<UserProfile>> {
    let mut tx = pool.begin().await?;

    let current: Option<(String,)> = sqlx::query_as("SELECT role FROM users WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some((role,)) = current else {
        return Ok(None);
    };

    let demotes_admin = role == UserRole::Admin.as_str() && changes.role == Some(UserRole::Staff);
    if demotes_admin && locked_admin_count(&mut *tx).await? <= 1 {
        return Err(last_admin("Cannot demote the last admin").into());
    }

    let updated = sqlx::query_as(
        r#"
        UPDATE users SET
            full_name = COALESCE($1, full_name),
            email = COALESCE($2, email),
            role = COALESCE($3, role),
            password_hash = COALESCE($4, password_hash)
        WHERE id = $5
        RETURNING id, username, full_name, email, role
        "#,
    )
    .bind(changes.full_name)
    .bind(changes.email)
    .bind(changes.role.map(|r| r.as_str()))
    .bind(changes.password_hash)
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(updated)
}

/// Returns false if no such user
pub async fn delete(pool: &PgPool, id: i64) -> ServiceResult<bool> {
    let mut tx = pool.begin().await?;

    let current: Option<(String,)> = sqlx::query_as("SELECT role FROM users WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some((role,)) = current else {
        return Ok(false);
    };

    if role == UserRole::Admin.as_str() && locked_admin_count(&mut *tx).await? <= 1 {
        return Err(last_admin("Cannot delete the last admin").into());
    }

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}

pub async fn set_permissions(
    pool: &PgPool,
    id: i64,
    permissions: &[String],
) -> Result<Option<UserSummary>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE users SET permissions = $1 WHERE id = $2 RETURNING id, username, role, permissions",
    )
    .bind(permissions)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn update_profile(
    pool: &PgPool,
    id: i64,
    full_name: Option<&str>,
    email: Option<&str>,
    password_hash: Option<&str>,
) -> Result<Option<UserProfile>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE users SET
            full_name = COALESCE($1, full_name),
            email = COALESCE($2, email),
            password_hash = COALESCE($3, password_hash)
        WHERE id = $4
        RETURNING id, username, full_name, email, role
        "#,
    )
    .bind(full_name)
    .bind(email)
    .bind(password_hash)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Create the first admin when no account exists yet
pub async fn bootstrap_admin(pool: &PgPool, username: &str, password: &str) -> Result<bool, BoxError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(false);
    }

    let hash = crate::util::hash_password(password).map_err(|e| e.to_string())?;
    sqlx::query(
        "INSERT INTO users (username, password_hash, role, permissions) VALUES ($1, $2, 'admin', $3)",
    )
    .bind(username)
    .bind(hash)
    .bind(vec![crate::auth::permissions::ALL.to_string()])
    .execute(pool)
    .await?;
    Ok(true)
}
