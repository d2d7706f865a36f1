//! Student Model
//!
//! `status` is never stored; it is derived from `membership_end` each time a
//! student is returned (see [`MembershipStatus::on`]).

use super::serde_helpers::FormField;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Derived membership status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Active,
    Expired,
}

impl MembershipStatus {
    /// A membership expires the day after `membership_end`.
    pub fn on(membership_end: NaiveDate, today: NaiveDate) -> Self {
        if membership_end < today {
            Self::Expired
        } else {
            Self::Active
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
        }
    }
}

/// Student row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub registration_number: Option<String>,
    pub father_name: Option<String>,
    pub aadhar_number: Option<String>,
    pub profile_image_url: Option<String>,
    /// Weak reference, branches may be deleted underneath
    pub branch_id: Option<i64>,
    pub membership_start: NaiveDate,
    pub membership_end: NaiveDate,
    pub total_fee: Decimal,
    pub amount_paid: Decimal,
    pub due_amount: Decimal,
    pub cash: Decimal,
    pub online: Decimal,
    pub security_money: Decimal,
    pub remark: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Student row joined with its branch name and latest assignment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StudentListing {
    #[serde(flatten)]
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub student: Student,
    pub branch_name: Option<String>,
    pub seat_id: Option<i64>,
    pub seat_number: Option<String>,
    pub shift_id: Option<i64>,
    pub shift_title: Option<String>,
}

/// Any student-shaped row with its derived status attached
#[derive(Debug, Clone, Serialize)]
pub struct StudentView<T> {
    #[serde(flatten)]
    pub row: T,
    pub status: MembershipStatus,
}

impl StudentView<Student> {
    pub fn new(row: Student, today: NaiveDate) -> Self {
        let status = MembershipStatus::on(row.membership_end, today);
        Self { row, status }
    }
}

impl StudentView<StudentListing> {
    pub fn listing(row: StudentListing, today: NaiveDate) -> Self {
        let status = MembershipStatus::on(row.student.membership_end, today);
        Self { row, status }
    }
}

/// Seat/shift pair held by a student
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AssignmentDetail {
    pub id: i64,
    pub seat_id: Option<i64>,
    pub seat_number: Option<String>,
    pub shift_id: i64,
    pub shift_title: Option<String>,
}

/// `GET /students/:id` body
#[derive(Debug, Clone, Serialize)]
pub struct StudentDetail {
    #[serde(flatten)]
    pub view: StudentView<StudentListing>,
    pub assignments: Vec<AssignmentDetail>,
}

/// Create / update / renew payload
///
/// Every numeric field goes through [`FormField`] so a bad value yields a
/// message naming the field rather than a JSON parse error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StudentPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub registration_number: Option<String>,
    pub father_name: Option<String>,
    pub aadhar_number: Option<String>,
    pub profile_image_url: Option<String>,
    pub remark: Option<String>,
    pub branch_id: FormField<i64>,
    pub membership_start: FormField<NaiveDate>,
    pub membership_end: FormField<NaiveDate>,
    pub total_fee: FormField<Decimal>,
    /// Optional; when present it must equal `cash + online`
    pub amount_paid: FormField<Decimal>,
    pub cash: FormField<Decimal>,
    pub online: FormField<Decimal>,
    pub security_money: FormField<Decimal>,
    pub seat_id: FormField<i64>,
    pub shift_ids: Option<Vec<FormField<i64>>>,
}

/// `PUT /students/:id/status` payload; the raw value is checked to be a boolean
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StudentStatusUpdate {
    pub is_active: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn status_is_active_through_the_end_date() {
        let end = date(2024, 5, 31);
        assert_eq!(MembershipStatus::on(end, date(2024, 5, 30)), MembershipStatus::Active);
        assert_eq!(MembershipStatus::on(end, date(2024, 5, 31)), MembershipStatus::Active);
        assert_eq!(MembershipStatus::on(end, date(2024, 6, 1)), MembershipStatus::Expired);
    }

    #[test]
    fn payload_accepts_form_strings() {
        let payload: StudentPayload = serde_json::from_str(
            r#"{
                "name": "Asha",
                "branch_id": "2",
                "membership_start": "2024-05-01",
                "membership_end": "2024-05-31",
                "total_fee": "1000",
                "cash": 600,
                "online": "",
                "seat_id": null,
                "shift_ids": [1, "3"]
            }"#,
        )
        .unwrap();

        assert_eq!(payload.branch_id, FormField::Value(2));
        assert_eq!(payload.cash, FormField::Value(Decimal::from(600)));
        assert!(payload.online.is_missing());
        assert!(payload.seat_id.is_missing());
        assert_eq!(
            payload.shift_ids,
            Some(vec![FormField::Value(1), FormField::Value(3)])
        );
    }

    #[test]
    fn view_serializes_status_next_to_row_fields() {
        let student = Student {
            id: 9,
            name: "Ravi".into(),
            email: None,
            phone: Some("98765".into()),
            address: None,
            registration_number: None,
            father_name: None,
            aadhar_number: None,
            profile_image_url: None,
            branch_id: Some(1),
            membership_start: date(2024, 4, 1),
            membership_end: date(2024, 4, 30),
            total_fee: Decimal::from(1000),
            amount_paid: Decimal::from(600),
            due_amount: Decimal::from(400),
            cash: Decimal::from(600),
            online: Decimal::ZERO,
            security_money: Decimal::ZERO,
            remark: None,
            is_active: true,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(StudentView::new(student, date(2024, 5, 2))).unwrap();
        assert_eq!(json["status"], "expired");
        assert_eq!(json["name"], "Ravi");
        assert_eq!(json["membership_end"], "2024-04-30");
        assert_eq!(json["due_amount"], 400.0);
    }
}
