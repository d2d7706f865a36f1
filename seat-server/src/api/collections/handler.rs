//! Collections API Handlers

use axum::{Json, extract::State};
use serde_json::{Value, json};
use shared::models::PaymentRequest;

use crate::api::extract::{ApiJson, ApiQuery, IdPath};
use crate::api::query::{MonthQuery, branch_filter, month_filter};
use crate::billing::Payment;
use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;

/// GET /collections?month=YYYY-MM&branchId=
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<MonthQuery>,
) -> ServiceResult<Json<Value>> {
    let month = month_filter(q.month.as_deref())?;
    let branch_id = branch_filter(q.branch_id.as_deref())?;

    let collections = db::collections::list(&state.pool, month, branch_id).await?;
    Ok(Json(json!({ "collections": collections })))
}

/// PUT /collections/:historyId - settle (part of) the due
pub async fn settle(
    State(state): State<AppState>,
    IdPath(history_id): IdPath,
    ApiJson(req): ApiJson<PaymentRequest>,
) -> ServiceResult<Json<Value>> {
    let payment = Payment::parse(&req)?;
    let collection = db::collections::settle(&state.pool, history_id, payment).await?;

    Ok(Json(json!({
        "message": "Payment updated successfully",
        "collection": collection,
    })))
}
