//! Validation of student create / update / renew payloads
//!
//! Turns a loosely typed [`StudentPayload`] into a [`StudentDraft`] that the
//! DB layer can write without further checks.

use chrono::NaiveDate;
use shared::error::{AppError, ErrorCode};
use shared::models::{FormField, StudentPayload};

use crate::billing::Fees;
use crate::util::non_blank;

/// Which write the payload is for; each one has its own required fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Renew,
}

impl Operation {
    fn missing_fields_message(&self) -> &'static str {
        match self {
            Self::Create => {
                "Required fields missing (name, branch_id, membership_start, membership_end)"
            }
            Self::Update => {
                "Required fields missing: Name, Phone, Address, Branch, and Membership Dates are required."
            }
            Self::Renew => "Required fields are missing",
        }
    }

    fn requires_phone(&self) -> bool {
        matches!(self, Self::Update | Self::Renew)
    }

    fn requires_address(&self) -> bool {
        matches!(self, Self::Update)
    }
}

/// Validated student write
#[derive(Debug, Clone, PartialEq)]
pub struct StudentDraft {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub registration_number: Option<String>,
    pub father_name: Option<String>,
    pub aadhar_number: Option<String>,
    pub profile_image_url: Option<String>,
    pub remark: Option<String>,
    pub branch_id: i64,
    pub membership_start: NaiveDate,
    pub membership_end: NaiveDate,
    pub fees: Fees,
    /// `None` books the shifts without a specific seat
    pub seat_id: Option<i64>,
    /// Deduplicated, in request order
    pub shift_ids: Vec<i64>,
}

impl StudentDraft {
    pub fn validate(payload: StudentPayload, op: Operation) -> Result<Self, AppError> {
        let missing = || AppError::required(op.missing_fields_message());

        let name = non_blank(payload.name).ok_or_else(missing)?;
        let phone = non_blank(payload.phone);
        let address = non_blank(payload.address);
        if (op.requires_phone() && phone.is_none()) || (op.requires_address() && address.is_none()) {
            return Err(missing());
        }

        let branch_id = id_field(payload.branch_id, "Invalid branch ID")?.ok_or_else(missing)?;
        let membership_start = date_field(payload.membership_start, "membership_start")?.ok_or_else(missing)?;
        let membership_end = date_field(payload.membership_end, "membership_end")?.ok_or_else(missing)?;
        if membership_end < membership_start {
            return Err(AppError::new(ErrorCode::MembershipDatesInvalid));
        }

        let fees = Fees::from_form(
            payload.total_fee,
            payload.amount_paid,
            payload.cash,
            payload.online,
            payload.security_money,
        )?;

        let seat_id = id_field(payload.seat_id, "Invalid seat ID")?;

        let mut shift_ids = Vec::new();
        for field in payload.shift_ids.unwrap_or_default() {
            if let Some(id) = id_field(field, "Invalid shift ID")? {
                if !shift_ids.contains(&id) {
                    shift_ids.push(id);
                }
            }
        }

        Ok(Self {
            name,
            email: non_blank(payload.email),
            phone,
            address,
            registration_number: non_blank(payload.registration_number),
            father_name: non_blank(payload.father_name),
            aadhar_number: non_blank(payload.aadhar_number),
            profile_image_url: non_blank(payload.profile_image_url),
            remark: non_blank(payload.remark),
            branch_id,
            membership_start,
            membership_end,
            fees,
            seat_id,
            shift_ids,
        })
    }

    /// Shift recorded on the history snapshot
    pub fn first_shift_id(&self) -> Option<i64> {
        self.shift_ids.first().copied()
    }
}

fn id_field(field: FormField<i64>, message: &str) -> Result<Option<i64>, AppError> {
    match field.into_option() {
        Ok(Some(id)) if id > 0 => Ok(Some(id)),
        Ok(None) => Ok(None),
        Ok(Some(id)) => Err(AppError::validation(message).with_detail("value", id)),
        Err(raw) => Err(AppError::validation(message).with_detail("value", raw)),
    }
}

fn date_field(field: FormField<NaiveDate>, name: &str) -> Result<Option<NaiveDate>, AppError> {
    field.into_option().map_err(|raw| {
        AppError::with_message(ErrorCode::InvalidFormat, format!("{name} must be a date (YYYY-MM-DD)"))
            .with_detail("value", raw)
    })
}
