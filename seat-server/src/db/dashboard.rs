//! Dashboard aggregates

use rust_decimal::Decimal;
use shared::models::DashboardStats;
use sqlx::PgPool;

use crate::calendar::MonthWindow;

/// Collection and due from current snapshots, expense from `expenses`
pub async fn stats(
    pool: &PgPool,
    month: MonthWindow,
    branch_id: Option<i64>,
) -> Result<DashboardStats, sqlx::Error> {
    let (collection, due): (Decimal, Decimal) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(amount_paid), 0), COALESCE(SUM(due_amount), 0)
        FROM student_membership_history
        WHERE superseded_at IS NULL
          AND changed_at >= $1 AND changed_at < $2
          AND ($3::BIGINT IS NULL OR branch_id = $3)
        "#,
    )
    .bind(month.start)
    .bind(month.end)
    .bind(branch_id)
    .fetch_one(pool)
    .await?;

    let (expense,): (Decimal,) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(amount), 0)
        FROM expenses
        WHERE date >= $1 AND date < $2
          AND ($3::BIGINT IS NULL OR branch_id = $3)
        "#,
    )
    .bind(month.start)
    .bind(month.end)
    .bind(branch_id)
    .fetch_one(pool)
    .await?;

    Ok(DashboardStats::new(collection, due, expense))
}
