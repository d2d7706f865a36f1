//! Student API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use serde_json::{Value, json};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    DashboardStats, SnapshotKind, StudentDetail, StudentListing, StudentPayload,
    StudentStatusUpdate, StudentView,
};

use crate::api::extract::{ApiJson, ApiQuery, IdPath, parse_id};
use crate::api::query::{
    BranchQuery, MonthQuery, ShiftQuery, branch_filter, month_filter, search_filter, status_filter,
};
use crate::calendar::{MonthWindow, expiring_until};
use crate::db;
use crate::db::students::Scope;
use crate::enrollment::{Operation, StudentDraft};
use crate::error::ServiceResult;
use crate::state::AppState;
use crate::util::today;

/// `{students: [...]}` envelope of every listing
#[derive(Debug, Serialize)]
pub struct StudentList {
    pub students: Vec<StudentView<StudentListing>>,
}

async fn listing(state: &AppState, scope: Scope<'_>, branch_id: Option<i64>) -> ServiceResult<Json<StudentList>> {
    let today = today();
    let rows = db::students::list(&state.pool, scope, branch_id, today).await?;
    let students = rows
        .into_iter()
        .map(|row| StudentView::listing(row, today))
        .collect();
    Ok(Json(StudentList { students }))
}

/// GET /students - enrolled (manually active) students
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<BranchQuery>,
) -> ServiceResult<Json<StudentList>> {
    let branch_id = branch_filter(q.branch_id.as_deref())?;
    listing(&state, Scope::Enrolled, branch_id).await
}

/// GET /students/active
pub async fn list_active(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<BranchQuery>,
) -> ServiceResult<Json<StudentList>> {
    let branch_id = branch_filter(q.branch_id.as_deref())?;
    listing(&state, Scope::Active, branch_id).await
}

/// GET /students/expired
pub async fn list_expired(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<BranchQuery>,
) -> ServiceResult<Json<StudentList>> {
    let branch_id = branch_filter(q.branch_id.as_deref())?;
    listing(&state, Scope::Expired, branch_id).await
}

/// GET /students/expiring-soon
pub async fn list_expiring_soon(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<BranchQuery>,
) -> ServiceResult<Json<StudentList>> {
    let branch_id = branch_filter(q.branch_id.as_deref())?;
    let until = expiring_until(today(), state.config.expiring_soon_days);
    listing(&state, Scope::ExpiringSoon { until }, branch_id).await
}

/// GET /students/inactive
pub async fn list_inactive(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<BranchQuery>,
) -> ServiceResult<Json<StudentList>> {
    let branch_id = branch_filter(q.branch_id.as_deref())?;
    listing(&state, Scope::Inactive, branch_id).await
}

/// GET /students/shift/:shiftId
pub async fn list_by_shift(
    State(state): State<AppState>,
    Path(shift_id): Path<String>,
    ApiQuery(q): ApiQuery<ShiftQuery>,
) -> ServiceResult<Json<StudentList>> {
    let shift_id = parse_id(&shift_id, "Invalid Shift ID")?;
    let branch_id = branch_filter(q.branch_id.as_deref())?;
    let scope = Scope::Shift {
        shift_id,
        search: search_filter(q.search.as_deref()),
        status: status_filter(q.status.as_deref())?,
    };
    listing(&state, scope, branch_id).await
}

/// GET /students/:id
pub async fn get_by_id(State(state): State<AppState>, IdPath(id): IdPath) -> ServiceResult<Json<StudentDetail>> {
    let row = db::students::find_listing(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::StudentNotFound))?;
    let assignments = db::assignments::for_student(&state.pool, id).await?;

    Ok(Json(StudentDetail {
        view: StudentView::listing(row, today()),
        assignments,
    }))
}

/// POST /students
pub async fn create(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<StudentPayload>,
) -> ServiceResult<(StatusCode, Json<Value>)> {
    let draft = StudentDraft::validate(payload, Operation::Create)?;
    let today = today();
    let student = db::students::create(&state.pool, &draft, today).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "student": StudentView::new(student, today) })),
    ))
}

/// PUT /students/:id
pub async fn update(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ApiJson(payload): ApiJson<StudentPayload>,
) -> ServiceResult<Json<Value>> {
    let draft = StudentDraft::validate(payload, Operation::Update)?;
    let today = today();
    let student = db::students::rewrite(&state.pool, id, &draft, SnapshotKind::Revision, today).await?;

    Ok(Json(json!({ "student": StudentView::new(student, today) })))
}

/// PUT|POST /students/:id/renew
pub async fn renew(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ApiJson(payload): ApiJson<StudentPayload>,
) -> ServiceResult<Json<Value>> {
    let draft = StudentDraft::validate(payload, Operation::Renew)?;
    let today = today();
    let student = db::students::rewrite(&state.pool, id, &draft, SnapshotKind::Renewal, today).await?;

    Ok(Json(json!({
        "message": "Membership renewed",
        "student": StudentView::new(student, today),
    })))
}

/// PUT /students/:id/status
pub async fn set_status(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ApiJson(payload): ApiJson<StudentStatusUpdate>,
) -> ServiceResult<Json<Value>> {
    let Some(Value::Bool(is_active)) = payload.is_active else {
        return Err(AppError::new(ErrorCode::StudentStatusInvalid).into());
    };

    let student = db::students::set_active(&state.pool, id, is_active).await?;
    let label = if is_active { "active" } else { "inactive" };

    Ok(Json(json!({
        "student": StudentView::new(student, today()),
        "message": format!("Student status updated to {label}."),
    })))
}

/// DELETE /students/:id
pub async fn delete(State(state): State<AppState>, IdPath(id): IdPath) -> ServiceResult<Json<Value>> {
    let student = db::students::delete(&state.pool, id).await?;

    Ok(Json(json!({
        "message": "Student deleted",
        "student": StudentView::new(student, today()),
    })))
}

/// GET /students/stats/dashboard - current month unless `month` is given
pub async fn dashboard(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<MonthQuery>,
) -> ServiceResult<Json<DashboardStats>> {
    let branch_id = branch_filter(q.branch_id.as_deref())?;
    let month = month_filter(q.month.as_deref())?.unwrap_or_else(|| MonthWindow::containing(today()));

    let stats = db::dashboard::stats(&state.pool, month, branch_id).await?;
    Ok(Json(stats))
}
