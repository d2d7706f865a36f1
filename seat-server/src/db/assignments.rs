//! Seat assignment ledger
//!
//! At most one student per non-null `(seat_id, shift_id)`. The pre-checks
//! here give readable errors; the partial unique index
//! `seat_assignments_seat_shift_uniq` catches concurrent writers.

use shared::error::{AppError, ErrorCode};
use shared::models::AssignmentDetail;
use sqlx::{PgConnection, PgPool};

use crate::error::{ServiceError, ServiceResult, is_unique_violation};

const SEAT_SHIFT_UNIQUE: &str = "seat_assignments_seat_shift_uniq";

fn seat_taken(shift_id: i64) -> AppError {
    AppError::with_message(
        ErrorCode::SeatAlreadyAssigned,
        format!("Seat is already assigned for shift {shift_id}"),
    )
    .with_detail("shift_id", shift_id)
}

/// Every referenced seat and shift must exist
pub async fn ensure_exist(
    conn: &mut PgConnection,
    seat_id: Option<i64>,
    shift_ids: &[i64],
) -> ServiceResult<()> {
    if let Some(seat_id) = seat_id {
        let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM seats WHERE id = $1")
            .bind(seat_id)
            .fetch_optional(&mut *conn)
            .await?;
        if found.is_none() {
            return Err(AppError::with_message(
                ErrorCode::SeatNotFound,
                format!("Seat with ID {seat_id} does not exist"),
            )
            .into());
        }
    }

    for &shift_id in shift_ids {
        let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM schedules WHERE id = $1")
            .bind(shift_id)
            .fetch_optional(&mut *conn)
            .await?;
        if found.is_none() {
            return Err(AppError::with_message(
                ErrorCode::ShiftNotFound,
                format!("Shift with ID {shift_id} does not exist"),
            )
            .into());
        }
    }
    Ok(())
}

/// Reject if another student holds `seat_id` in any of `shift_ids`
///
/// `owner` is excluded so a student can keep their own seat on update/renew.
/// A null seat never conflicts.
pub async fn ensure_free(
    conn: &mut PgConnection,
    seat_id: Option<i64>,
    shift_ids: &[i64],
    owner: Option<i64>,
) -> ServiceResult<()> {
    let Some(seat_id) = seat_id else {
        return Ok(());
    };

    for &shift_id in shift_ids {
        let taken: Option<(i64,)> = sqlx::query_as(
            r#"
            SELECT id FROM seat_assignments
            WHERE seat_id = $1 AND shift_id = $2
              AND ($3::BIGINT IS NULL OR student_id <> $3)
            LIMIT 1
            "#,
        )
        .bind(seat_id)
        .bind(shift_id)
        .bind(owner)
        .fetch_optional(&mut *conn)
        .await?;
        if taken.is_some() {
            return Err(seat_taken(shift_id).into());
        }
    }
    Ok(())
}

/// Drop all of a student's assignments and book the new set
pub async fn replace(
    conn: &mut PgConnection,
    student_id: i64,
    seat_id: Option<i64>,
    shift_ids: &[i64],
) -> ServiceResult<()> {
    release(conn, student_id).await?;

    for &shift_id in shift_ids {
        sqlx::query("INSERT INTO seat_assignments (seat_id, shift_id, student_id) VALUES ($1, $2, $3)")
            .bind(seat_id)
            .bind(shift_id)
            .bind(student_id)
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                if is_unique_violation(&e, SEAT_SHIFT_UNIQUE) {
                    tracing::warn!(seat_id, shift_id, student_id, "Seat taken by a concurrent writer");
                    ServiceError::from(seat_taken(shift_id))
                } else {
                    ServiceError::from(e)
                }
            })?;
    }
    Ok(())
}

/// Free every seat a student holds
pub async fn release(conn: &mut PgConnection, student_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM seat_assignments WHERE student_id = $1")
        .bind(student_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// Assignments of one student with seat numbers and shift titles
pub async fn for_student(pool: &PgPool, student_id: i64) -> Result<Vec<AssignmentDetail>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT sa.id, sa.seat_id, st.seat_number, sa.shift_id, sch.title AS shift_title
        FROM seat_assignments sa
        LEFT JOIN seats st ON st.id = sa.seat_id
        LEFT JOIN schedules sch ON sch.id = sa.shift_id
        WHERE sa.student_id = $1
        ORDER BY sa.id
        "#,
    )
    .bind(student_id)
    .fetch_all(pool)
    .await
}
