//! Membership history log
//!
//! Snapshots are append-only. A revision stamps `superseded_at` on the row it
//! replaces, so "current" rows (`superseded_at IS NULL`) count each
//! enrollment/renewal cycle exactly once.

use chrono::NaiveDate;
use shared::models::{MembershipStatus, SnapshotKind};
use sqlx::PgConnection;

use crate::enrollment::StudentDraft;

/// Write a snapshot of `draft` for `student_id`; returns the new row id
pub async fn append(
    conn: &mut PgConnection,
    student_id: i64,
    kind: SnapshotKind,
    draft: &StudentDraft,
    today: NaiveDate,
) -> Result<i64, sqlx::Error> {
    let status = MembershipStatus::on(draft.membership_end, today);
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO student_membership_history (
            student_id, kind, name, email, phone, address,
            registration_number, father_name, aadhar_number,
            membership_start, membership_end, status,
            total_fee, amount_paid, due_amount, cash, online, security_money,
            remark, seat_id, shift_id, branch_id, changed_at
        )
        VALUES (
            $1, $2, $3, $4, $5, $6,
            $7, $8, $9,
            $10, $11, $12,
            $13, $14, $15, $16, $17, $18,
            $19, $20, $21, $22, NOW()
        )
        RETURNING id
        "#,
    )
    .bind(student_id)
    .bind(kind.as_str())
    .bind(&draft.name)
    .bind(&draft.email)
    .bind(&draft.phone)
    .bind(&draft.address)
    .bind(&draft.registration_number)
    .bind(&draft.father_name)
    .bind(&draft.aadhar_number)
    .bind(draft.membership_start)
    .bind(draft.membership_end)
    .bind(status.as_str())
    .bind(draft.fees.total_fee)
    .bind(draft.fees.amount_paid())
    .bind(draft.fees.due_amount())
    .bind(draft.fees.cash)
    .bind(draft.fees.online)
    .bind(draft.fees.security_money)
    .bind(&draft.remark)
    .bind(draft.seat_id)
    .bind(draft.first_shift_id())
    .bind(draft.branch_id)
    .fetch_one(conn)
    .await?;

    tracing::debug!(student_id, history_id = id, kind = kind.as_str(), "History snapshot appended");
    Ok(id)
}

/// Retire the student's newest current snapshot, if any
pub async fn supersede_current(conn: &mut PgConnection, student_id: i64) -> Result<Option<i64>, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as(
        r#"
        UPDATE student_membership_history SET superseded_at = NOW()
        WHERE id = (
            SELECT id FROM student_membership_history
            WHERE student_id = $1 AND superseded_at IS NULL
            ORDER BY id DESC
            LIMIT 1
        )
        RETURNING id
        "#,
    )
    .bind(student_id)
    .fetch_optional(conn)
    .await?;
    Ok(row.map(|(id,)| id))
}

/// Id of the student's newest current snapshot
pub async fn current_id(conn: &mut PgConnection, student_id: i64) -> Result<Option<i64>, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as(
        r#"
        SELECT id FROM student_membership_history
        WHERE student_id = $1 AND superseded_at IS NULL
        ORDER BY id DESC
        LIMIT 1
        "#,
    )
    .bind(student_id)
    .fetch_optional(conn)
    .await?;
    Ok(row.map(|(id,)| id))
}

pub async fn delete_for_student(conn: &mut PgConnection, student_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM student_membership_history WHERE student_id = $1")
        .bind(student_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}
