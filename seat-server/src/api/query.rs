//! Query-string parameters shared by list endpoints

use serde::Deserialize;
use shared::error::AppError;
use shared::models::MembershipStatus;

use crate::calendar::MonthWindow;

/// `?branchId=`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchQuery {
    pub branch_id: Option<String>,
}

/// `?search=&status=&branchId=` on shift listings
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub branch_id: Option<String>,
}

/// `?month=YYYY-MM&branchId=`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthQuery {
    pub month: Option<String>,
    pub branch_id: Option<String>,
}

/// Empty or `all` means every branch
pub fn branch_filter(raw: Option<&str>) -> Result<Option<i64>, AppError> {
    match raw.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(value) => value
            .parse::<i64>()
            .map(Some)
            .map_err(|_| AppError::validation("Invalid branch ID").with_detail("branchId", value)),
    }
}

/// `all` (or nothing) means no status filter
pub fn status_filter(raw: Option<&str>) -> Result<Option<MembershipStatus>, AppError> {
    match raw.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some("active") => Ok(Some(MembershipStatus::Active)),
        Some("expired") => Ok(Some(MembershipStatus::Expired)),
        Some(other) => Err(AppError::validation("Invalid status filter. Use all, active or expired")
            .with_detail("status", other)),
    }
}

/// Missing or blank month means no month filter
pub fn month_filter(raw: Option<&str>) -> Result<Option<MonthWindow>, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => MonthWindow::parse(value).map(Some),
    }
}

/// Blank search is no search
pub fn search_filter(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_filter_accepts_all_and_blank() {
        assert_eq!(branch_filter(None).unwrap(), None);
        assert_eq!(branch_filter(Some("")).unwrap(), None);
        assert_eq!(branch_filter(Some("all")).unwrap(), None);
        assert_eq!(branch_filter(Some("3")).unwrap(), Some(3));
    }

    #[test]
    fn branch_filter_rejects_text() {
        let err = branch_filter(Some("north")).unwrap_err();
        assert_eq!(err.message, "Invalid branch ID");
    }

    #[test]
    fn status_filter_values() {
        assert_eq!(status_filter(Some("all")).unwrap(), None);
        assert_eq!(status_filter(Some("active")).unwrap(), Some(MembershipStatus::Active));
        assert_eq!(status_filter(Some("expired")).unwrap(), Some(MembershipStatus::Expired));
        assert!(status_filter(Some("paused")).is_err());
    }

    #[test]
    fn month_filter_is_optional() {
        assert!(month_filter(None).unwrap().is_none());
        assert!(month_filter(Some("2024-07")).unwrap().is_some());
        assert!(month_filter(Some("July")).is_err());
    }

    #[test]
    fn search_filter_trims() {
        assert_eq!(search_filter(Some("  ravi ")), Some("ravi"));
        assert_eq!(search_filter(Some("   ")), None);
    }
}
