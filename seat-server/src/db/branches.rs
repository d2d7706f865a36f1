//! Branch registry

use shared::models::Branch;
use sqlx::PgPool;

pub async fn list(pool: &PgPool) -> Result<Vec<Branch>, sqlx::Error> {
    sqlx::query_as("SELECT id, name, code FROM branches ORDER BY name")
        .fetch_all(pool)
        .await
}

pub async fn create(pool: &PgPool, name: &str, code: Option<&str>) -> Result<Branch, sqlx::Error> {
    sqlx::query_as("INSERT INTO branches (name, code) VALUES ($1, $2) RETURNING id, name, code")
        .bind(name)
        .bind(code)
        .fetch_one(pool)
        .await
}

/// Missing `name` keeps the stored one; `code` is always overwritten
pub async fn update(
    pool: &PgPool,
    id: i64,
    name: Option<&str>,
    code: Option<&str>,
) -> Result<Option<Branch>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE branches SET
            name = COALESCE($1, name),
            code = $2
        WHERE id = $3
        RETURNING id, name, code
        "#,
    )
    .bind(name)
    .bind(code)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Returns false if no such branch
pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM branches WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
