//! Collections report and due settlement

use shared::error::{AppError, ErrorCode};
use shared::models::CollectionEntry;
use sqlx::{PgConnection, PgPool};

use crate::billing::{Fees, Payment};
use crate::calendar::MonthWindow;
use crate::error::ServiceResult;

const ENTRY_COLUMNS: &str = r#"
    SELECT h.id AS history_id, h.student_id, h.name, h.phone,
           sch.title AS shift_title,
           h.total_fee, h.amount_paid, h.due_amount,
           h.cash, h.online, h.security_money, h.remark,
           h.changed_at AS created_at,
           h.branch_id, b.name AS branch_name
    FROM student_membership_history h
    LEFT JOIN schedules sch ON sch.id = h.shift_id
    LEFT JOIN branches b ON b.id = h.branch_id
"#;

/// Current snapshots, optionally limited to a month and a branch
pub async fn list(
    pool: &PgPool,
    month: Option<MonthWindow>,
    branch_id: Option<i64>,
) -> Result<Vec<CollectionEntry>, sqlx::Error> {
    let sql = format!(
        r#"{ENTRY_COLUMNS}
        WHERE h.superseded_at IS NULL
          AND ($1::DATE IS NULL OR h.changed_at >= $1)
          AND ($2::DATE IS NULL OR h.changed_at < $2)
          AND ($3::BIGINT IS NULL OR h.branch_id = $3)
        ORDER BY h.name, h.id
        "#
    );
    sqlx::query_as(&sql)
        .bind(month.map(|m| m.start))
        .bind(month.map(|m| m.end))
        .bind(branch_id)
        .fetch_all(pool)
        .await
}

async fn find(conn: &mut PgConnection, history_id: i64) -> Result<Option<CollectionEntry>, sqlx::Error> {
    let sql = format!("{ENTRY_COLUMNS} WHERE h.id = $1");
    sqlx::query_as(&sql).bind(history_id).fetch_optional(conn).await
}

#[derive(sqlx::FromRow)]
struct SnapshotFees {
    student_id: i64,
    total_fee: rust_decimal::Decimal,
    cash: rust_decimal::Decimal,
    online: rust_decimal::Decimal,
    security_money: rust_decimal::Decimal,
}

/// Apply a payment to one history snapshot
///
/// The live student row follows only when the snapshot is the student's
/// newest current one; older cycles keep their own totals.
pub async fn settle(pool: &PgPool, history_id: i64, payment: Payment) -> ServiceResult<CollectionEntry> {
    let mut tx = pool.begin().await?;

    let (owner,): (i64,) = sqlx::query_as("SELECT student_id FROM student_membership_history WHERE id = $1")
        .bind(history_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::HistoryNotFound))?;

    // Student before snapshot, the same order as student writes
    super::students::lock(&mut *tx, owner).await?;

    let snapshot: SnapshotFees = sqlx::query_as(
        r#"
        SELECT student_id, total_fee, cash, online, security_money
        FROM student_membership_history
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(history_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::new(ErrorCode::HistoryNotFound))?;

    let fees = payment.apply(Fees {
        total_fee: snapshot.total_fee,
        cash: snapshot.cash,
        online: snapshot.online,
        security_money: snapshot.security_money,
    })?;

    sqlx::query(
        r#"
        UPDATE student_membership_history
        SET cash = $1, online = $2, amount_paid = $3, due_amount = $4
        WHERE id = $5
        "#,
    )
    .bind(fees.cash)
    .bind(fees.online)
    .bind(fees.amount_paid())
    .bind(fees.due_amount())
    .bind(history_id)
    .execute(&mut *tx)
    .await?;

    let is_current = super::history::current_id(&mut *tx, snapshot.student_id).await? == Some(history_id);
    if is_current {
        sqlx::query(
            r#"
            UPDATE students
            SET cash = $1, online = $2, amount_paid = $3, due_amount = $4
            WHERE id = $5
            "#,
        )
        .bind(fees.cash)
        .bind(fees.online)
        .bind(fees.amount_paid())
        .bind(fees.due_amount())
        .bind(snapshot.student_id)
        .execute(&mut *tx)
        .await?;
    }

    let entry = find(&mut *tx, history_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::HistoryNotFound))?;

    tx.commit().await?;
    tracing::info!(
        history_id,
        student_id = snapshot.student_id,
        amount = %payment.amount,
        method = payment.method.as_str(),
        synced_student = is_current,
        "Payment settled"
    );
    Ok(entry)
}
