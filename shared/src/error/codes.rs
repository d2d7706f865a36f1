//! Unified error codes for seatdesk
//!
//! This module defines all error codes used by the server and the web client.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Branch errors
//! - 4xxx: Student / membership errors
//! - 5xxx: Payment and fee errors
//! - 6xxx: Seat and shift errors
//! - 7xxx: User account errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the web client can
/// branch on them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,
    /// The last admin account cannot be removed or demoted
    LastAdminRequired = 2006,

    // ==================== 3xxx: Branch ====================
    /// Branch not found
    BranchNotFound = 3001,
    /// Branch name missing
    BranchNameRequired = 3002,

    // ==================== 4xxx: Student ====================
    /// Student not found
    StudentNotFound = 4001,
    /// Membership end precedes membership start
    MembershipDatesInvalid = 4002,
    /// Status payload is not a boolean
    StudentStatusInvalid = 4003,
    /// Membership history snapshot not found
    HistoryNotFound = 4101,

    // ==================== 5xxx: Payment ====================
    /// Payment amount is not a positive number
    PaymentInvalidAmount = 5001,
    /// Payment method is not cash or online
    PaymentInvalidMethod = 5002,
    /// Payment is larger than the outstanding due
    PaymentExceedsDue = 5003,
    /// Fee field is negative or not a number
    FeeInvalid = 5004,
    /// Supplied amount_paid disagrees with cash + online
    AmountPaidMismatch = 5005,
    /// Collected amount is larger than the total fee
    FeeOverpaid = 5006,

    // ==================== 6xxx: Seat / Shift ====================
    /// Seat not found
    SeatNotFound = 6001,
    /// Seat already taken for a shift
    SeatAlreadyAssigned = 6002,
    /// Shift not found
    ShiftNotFound = 6101,

    // ==================== 7xxx: User ====================
    /// User not found
    UserNotFound = 7001,
    /// Username already exists
    UsernameExists = 7002,
    /// Email already used by another account
    EmailInUse = 7003,
    /// Current password does not match
    CurrentPasswordIncorrect = 7004,
    /// Role is not admin or staff
    InvalidRole = 7005,
    /// Permissions payload is not an array of strings
    PermissionsInvalid = 7006,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required fields are missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "Authentication required",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",
            ErrorCode::LastAdminRequired => "At least one admin account must remain",

            // Branch
            ErrorCode::BranchNotFound => "Branch not found",
            ErrorCode::BranchNameRequired => "Branch name is required",

            // Student
            ErrorCode::StudentNotFound => "Student not found",
            ErrorCode::MembershipDatesInvalid => {
                "Membership end date cannot be before the start date"
            }
            ErrorCode::StudentStatusInvalid => "is_active must be a boolean value.",
            ErrorCode::HistoryNotFound => "History record not found",

            // Payment
            ErrorCode::PaymentInvalidAmount => "Invalid payment_amount",
            ErrorCode::PaymentInvalidMethod => "Invalid payment_method",
            ErrorCode::PaymentExceedsDue => "Payment exceeds due amount",
            ErrorCode::FeeInvalid => "Fee amounts must be valid non-negative numbers",
            ErrorCode::AmountPaidMismatch => "amount_paid must equal cash + online",
            ErrorCode::FeeOverpaid => "Amount paid cannot exceed total fee",

            // Seat / Shift
            ErrorCode::SeatNotFound => "Seat does not exist",
            ErrorCode::SeatAlreadyAssigned => "Seat is already assigned",
            ErrorCode::ShiftNotFound => "Shift does not exist",

            // User
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::UsernameExists => "Username already exists",
            ErrorCode::EmailInUse => "Email already in use",
            ErrorCode::CurrentPasswordIncorrect => "Current password is incorrect",
            ErrorCode::InvalidRole => "Invalid role",
            ErrorCode::PermissionsInvalid => "Permissions must be an array",

            // System
            ErrorCode::InternalError => "Server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),
            2006 => Ok(ErrorCode::LastAdminRequired),

            // Branch
            3001 => Ok(ErrorCode::BranchNotFound),
            3002 => Ok(ErrorCode::BranchNameRequired),

            // Student
            4001 => Ok(ErrorCode::StudentNotFound),
            4002 => Ok(ErrorCode::MembershipDatesInvalid),
            4003 => Ok(ErrorCode::StudentStatusInvalid),
            4101 => Ok(ErrorCode::HistoryNotFound),

            // Payment
            5001 => Ok(ErrorCode::PaymentInvalidAmount),
            5002 => Ok(ErrorCode::PaymentInvalidMethod),
            5003 => Ok(ErrorCode::PaymentExceedsDue),
            5004 => Ok(ErrorCode::FeeInvalid),
            5005 => Ok(ErrorCode::AmountPaidMismatch),
            5006 => Ok(ErrorCode::FeeOverpaid),

            // Seat / Shift
            6001 => Ok(ErrorCode::SeatNotFound),
            6002 => Ok(ErrorCode::SeatAlreadyAssigned),
            6101 => Ok(ErrorCode::ShiftNotFound),

            // User
            7001 => Ok(ErrorCode::UserNotFound),
            7002 => Ok(ErrorCode::UsernameExists),
            7003 => Ok(ErrorCode::EmailInUse),
            7004 => Ok(ErrorCode::CurrentPasswordIncorrect),
            7005 => Ok(ErrorCode::InvalidRole),
            7006 => Ok(ErrorCode::PermissionsInvalid),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::BranchNotFound.code(), 3001);
        assert_eq!(ErrorCode::StudentNotFound.code(), 4001);
        assert_eq!(ErrorCode::HistoryNotFound.code(), 4101);
        assert_eq!(ErrorCode::PaymentExceedsDue.code(), 5003);
        assert_eq!(ErrorCode::SeatAlreadyAssigned.code(), 6002);
        assert_eq!(ErrorCode::UsernameExists.code(), 7002);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::NotFound.is_success());
        assert!(!ErrorCode::InternalError.is_success());
    }

    #[test]
    fn test_try_from_covers_every_variant() {
        let all = [
            ErrorCode::Success,
            ErrorCode::Unknown,
            ErrorCode::ValidationFailed,
            ErrorCode::NotFound,
            ErrorCode::InvalidRequest,
            ErrorCode::InvalidFormat,
            ErrorCode::RequiredField,
            ErrorCode::ValueOutOfRange,
            ErrorCode::NotAuthenticated,
            ErrorCode::InvalidCredentials,
            ErrorCode::TokenExpired,
            ErrorCode::TokenInvalid,
            ErrorCode::PermissionDenied,
            ErrorCode::AdminRequired,
            ErrorCode::LastAdminRequired,
            ErrorCode::BranchNotFound,
            ErrorCode::BranchNameRequired,
            ErrorCode::StudentNotFound,
            ErrorCode::MembershipDatesInvalid,
            ErrorCode::StudentStatusInvalid,
            ErrorCode::HistoryNotFound,
            ErrorCode::PaymentInvalidAmount,
            ErrorCode::PaymentInvalidMethod,
            ErrorCode::PaymentExceedsDue,
            ErrorCode::FeeInvalid,
            ErrorCode::AmountPaidMismatch,
            ErrorCode::FeeOverpaid,
            ErrorCode::SeatNotFound,
            ErrorCode::SeatAlreadyAssigned,
            ErrorCode::ShiftNotFound,
            ErrorCode::UserNotFound,
            ErrorCode::UsernameExists,
            ErrorCode::EmailInUse,
            ErrorCode::CurrentPasswordIncorrect,
            ErrorCode::InvalidRole,
            ErrorCode::PermissionsInvalid,
            ErrorCode::InternalError,
            ErrorCode::DatabaseError,
            ErrorCode::ConfigError,
        ];

        for code in all {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(4), Err(InvalidErrorCode(4)));
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(10000), Err(InvalidErrorCode(10000)));
    }

    #[test]
    fn test_serialize() {
        assert_eq!(serde_json::to_string(&ErrorCode::NotFound).unwrap(), "3");
        assert_eq!(
            serde_json::to_string(&ErrorCode::StudentNotFound).unwrap(),
            "4001"
        );
        assert_eq!(serde_json::to_string(&ErrorCode::Success).unwrap(), "0");
    }

    #[test]
    fn test_deserialize() {
        let code: ErrorCode = serde_json::from_str("5003").unwrap();
        assert_eq!(code, ErrorCode::PaymentExceedsDue);

        let result: Result<ErrorCode, _> = serde_json::from_str("999");
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::Success), "0");
        assert_eq!(format!("{}", ErrorCode::SeatNotFound), "6001");
        assert_eq!(format!("{}", ErrorCode::InternalError), "9001");
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::HistoryNotFound.message(), "History record not found");
        assert_eq!(
            ErrorCode::PaymentExceedsDue.message(),
            "Payment exceeds due amount"
        );
        assert_eq!(ErrorCode::InternalError.message(), "Server error");
    }

    #[test]
    fn test_invalid_error_code_display() {
        let err = InvalidErrorCode(999);
        assert_eq!(format!("{}", err), "invalid error code: 999");
    }
}
