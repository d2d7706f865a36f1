//! Student registry
//!
//! Writes run in one transaction each: student row, seat assignments and the
//! history snapshot commit or roll back together.

use chrono::NaiveDate;
use shared::error::{AppError, ErrorCode};
use shared::models::{MembershipStatus, SnapshotKind, Student, StudentListing};
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use super::{assignments, history};
use crate::enrollment::StudentDraft;
use crate::error::ServiceResult;

/// Which students a listing returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'a> {
    /// `is_active`, any membership status
    Enrolled,
    /// `is_active` and not yet expired
    Active,
    /// `is_active` and expired
    Expired,
    /// Membership ending between today and `until` (inclusive)
    ExpiringSoon { until: NaiveDate },
    /// Manually deactivated
    Inactive,
    /// Holding an assignment in `shift_id`
    Shift {
        shift_id: i64,
        search: Option<&'a str>,
        status: Option<MembershipStatus>,
    },
}

const LISTING_COLUMNS: &str = r#"
    SELECT s.*, b.name AS branch_name,
           a.seat_id, st.seat_number, a.shift_id, sch.title AS shift_title
    FROM students s
    LEFT JOIN branches b ON b.id = s.branch_id
"#;

const LATEST_ASSIGNMENT: &str = r#"
    LEFT JOIN LATERAL (
        SELECT seat_id, shift_id FROM seat_assignments
        WHERE student_id = s.id
        ORDER BY id DESC
        LIMIT 1
    ) a ON TRUE
"#;

const ASSIGNMENT_LOOKUPS: &str = r#"
    LEFT JOIN seats st ON st.id = a.seat_id
    LEFT JOIN schedules sch ON sch.id = a.shift_id
    WHERE TRUE
"#;

/// `%`, `_` and `\` match literally
fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

pub async fn list(
    pool: &PgPool,
    scope: Scope<'_>,
    branch_id: Option<i64>,
    today: NaiveDate,
) -> Result<Vec<StudentListing>, sqlx::Error> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(LISTING_COLUMNS);

    if let Scope::Shift { shift_id, .. } = scope {
        qb.push(" JOIN seat_assignments a ON a.student_id = s.id AND a.shift_id = ");
        qb.push_bind(shift_id);
    } else {
        qb.push(LATEST_ASSIGNMENT);
    }
    qb.push(ASSIGNMENT_LOOKUPS);

    match scope {
        Scope::Enrolled => {
            qb.push(" AND s.is_active");
        }
        Scope::Active => {
            qb.push(" AND s.is_active AND s.membership_end >= ");
            qb.push_bind(today);
        }
        Scope::Expired => {
            qb.push(" AND s.is_active AND s.membership_end < ");
            qb.push_bind(today);
        }
        Scope::ExpiringSoon { until } => {
            qb.push(" AND s.membership_end >= ");
            qb.push_bind(today);
            qb.push(" AND s.membership_end <= ");
            qb.push_bind(until);
        }
        Scope::Inactive => {
            qb.push(" AND NOT s.is_active");
        }
        Scope::Shift { search, status, .. } => {
            if let Some(search) = search {
                let pattern = like_pattern(search);
                qb.push(" AND (s.name ILIKE ");
                qb.push_bind(pattern.clone());
                qb.push(" OR s.phone ILIKE ");
                qb.push_bind(pattern);
                qb.push(")");
            }
            match status {
                Some(MembershipStatus::Active) => {
                    qb.push(" AND s.membership_end >= ");
                    qb.push_bind(today);
                }
                Some(MembershipStatus::Expired) => {
                    qb.push(" AND s.membership_end < ");
                    qb.push_bind(today);
                }
                None => {}
            }
        }
    }

    if let Some(branch_id) = branch_id {
        qb.push(" AND s.branch_id = ");
        qb.push_bind(branch_id);
    }

    if matches!(scope, Scope::ExpiringSoon { .. }) {
        qb.push(" ORDER BY s.membership_end, s.name");
    } else {
        qb.push(" ORDER BY s.name, s.id");
    }

    qb.build_query_as::<StudentListing>().fetch_all(pool).await
}

/// Student with branch name and latest assignment
pub async fn find_listing(pool: &PgPool, id: i64) -> Result<Option<StudentListing>, sqlx::Error> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(LISTING_COLUMNS);
    qb.push(LATEST_ASSIGNMENT);
    qb.push(ASSIGNMENT_LOOKUPS);
    qb.push(" AND s.id = ");
    qb.push_bind(id);
    qb.build_query_as::<StudentListing>().fetch_optional(pool).await
}

/// Bind the 18 writable student columns in `$1..$18` order
fn bind_draft<'q>(
    query: QueryAs<'q, Postgres, Student, PgArguments>,
    draft: &'q StudentDraft,
) -> QueryAs<'q, Postgres, Student, PgArguments> {
    query
        .bind(&draft.name)
        .bind(&draft.email)
        .bind(&draft.phone)
        .bind(&draft.address)
        .bind(&draft.registration_number)
        .bind(&draft.father_name)
        .bind(&draft.aadhar_number)
        .bind(&draft.profile_image_url)
        .bind(&draft.remark)
        .bind(draft.branch_id)
        .bind(draft.membership_start)
        .bind(draft.membership_end)
        .bind(draft.fees.total_fee)
        .bind(draft.fees.amount_paid())
        .bind(draft.fees.due_amount())
        .bind(draft.fees.cash)
        .bind(draft.fees.online)
        .bind(draft.fees.security_money)
}

/// Row-lock a student for the rest of the transaction; false if absent
///
/// Every write touching a student and its history takes this lock first.
pub async fn lock(conn: &mut PgConnection, id: i64) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM students WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row.is_some())
}

fn student_not_found() -> AppError {
    AppError::with_message(ErrorCode::StudentNotFound, "Student not found")
}

/// Insert a student, book its shifts and record the enrollment snapshot
pub async fn create(pool: &PgPool, draft: &StudentDraft, today: NaiveDate) -> ServiceResult<Student> {
    let mut tx = pool.begin().await?;

    assignments::ensure_exist(&mut *tx, draft.seat_id, &draft.shift_ids).await?;
    assignments::ensure_free(&mut *tx, draft.seat_id, &draft.shift_ids, None).await?;

    let student: Student = bind_draft(
        sqlx::query_as(
            r#"
            INSERT INTO students (
                name, email, phone, address,
                registration_number, father_name, aadhar_number, profile_image_url, remark,
                branch_id, membership_start, membership_end,
                total_fee, amount_paid, due_amount, cash, online, security_money
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING *
            "#,
        ),
        draft,
    )
    .fetch_one(&mut *tx)
    .await?;

    assignments::replace(&mut *tx, student.id, draft.seat_id, &draft.shift_ids).await?;
    history::append(&mut *tx, student.id, SnapshotKind::Enrollment, draft, today).await?;

    tx.commit().await?;
    tracing::info!(student_id = student.id, name = %student.name, "Student created");
    Ok(student)
}

/// Overwrite a student and its assignments
///
/// `Revision` retires the current snapshot and appends a new one;
/// `Renewal` starts a new cycle next to the previous one.
pub async fn rewrite(
    pool: &PgPool,
    id: i64,
    draft: &StudentDraft,
    kind: SnapshotKind,
    today: NaiveDate,
) -> ServiceResult<Student> {
    let mut tx = pool.begin().await?;

    if !lock(&mut *tx, id).await? {
        return Err(student_not_found().into());
    }

    assignments::ensure_exist(&mut *tx, draft.seat_id, &draft.shift_ids).await?;
    assignments::ensure_free(&mut *tx, draft.seat_id, &draft.shift_ids, Some(id)).await?;

    let student: Student = bind_draft(
        sqlx::query_as(
            r#"
            UPDATE students SET
                name = $1, email = $2, phone = $3, address = $4,
                registration_number = $5, father_name = $6, aadhar_number = $7,
                profile_image_url = $8, remark = $9,
                branch_id = $10, membership_start = $11, membership_end = $12,
                total_fee = $13, amount_paid = $14, due_amount = $15,
                cash = $16, online = $17, security_money = $18
            WHERE id = $19
            RETURNING *
            "#,
        ),
        draft,
    )
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    assignments::replace(&mut *tx, id, draft.seat_id, &draft.shift_ids).await?;

    if kind == SnapshotKind::Revision {
        history::supersede_current(&mut *tx, id).await?;
    }
    history::append(&mut *tx, id, kind, draft, today).await?;

    tx.commit().await?;
    tracing::info!(student_id = id, kind = kind.as_str(), "Student rewritten");
    Ok(student)
}

/// Set `is_active`; deactivation frees the student's seats
pub async fn set_active(pool: &PgPool, id: i64, active: bool) -> ServiceResult<Student> {
    let mut tx = pool.begin().await?;

    let student: Student = sqlx::query_as("UPDATE students SET is_active = $1 WHERE id = $2 RETURNING *")
        .bind(active)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(student_not_found)?;

    if !active {
        let freed = assignments::release(&mut *tx, id).await?;
        tracing::info!(student_id = id, freed, "Student deactivated");
    }

    tx.commit().await?;
    Ok(student)
}

/// Delete a student with its assignments and history
pub async fn delete(pool: &PgPool, id: i64) -> ServiceResult<Student> {
    let mut tx = pool.begin().await?;

    if !lock(&mut *tx, id).await? {
        return Err(student_not_found().into());
    }
    assignments::release(&mut *tx, id).await?;
    history::delete_for_student(&mut *tx, id).await?;
    let student: Student = sqlx::query_as("DELETE FROM students WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(student_not_found)?;

    tx.commit().await?;
    tracing::info!(student_id = id, "Student deleted");
    Ok(student)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ravi"), "%ravi%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
