//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 3xxx: Branch errors
/// - 4xxx: Student errors
/// - 5xxx: Payment errors
/// - 6xxx: Seat errors
/// - 7xxx: User errors
/// - 8xxx and above: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Branch errors (3xxx)
    Branch,
    /// Student errors (4xxx)
    Student,
    /// Payment errors (5xxx)
    Payment,
    /// Seat errors (6xxx)
    Seat,
    /// User errors (7xxx)
    User,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Branch,
            4000..5000 => Self::Student,
            5000..6000 => Self::Payment,
            6000..7000 => Self::Seat,
            7000..8000 => Self::User,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Branch => "branch",
            Self::Student => "student",
            Self::Payment => "payment",
            Self::Seat => "seat",
            Self::User => "user",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(2001), ErrorCategory::Permission);
        assert_eq!(ErrorCategory::from_code(3001), ErrorCategory::Branch);
        assert_eq!(ErrorCategory::from_code(4101), ErrorCategory::Student);
        assert_eq!(ErrorCategory::from_code(5001), ErrorCategory::Payment);
        assert_eq!(ErrorCategory::from_code(6101), ErrorCategory::Seat);
        assert_eq!(ErrorCategory::from_code(7001), ErrorCategory::User);
        assert_eq!(ErrorCategory::from_code(8001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::Success.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::TokenExpired.category(), ErrorCategory::Auth);
        assert_eq!(
            ErrorCode::LastAdminRequired.category(),
            ErrorCategory::Permission
        );
        assert_eq!(ErrorCode::BranchNotFound.category(), ErrorCategory::Branch);
        assert_eq!(ErrorCode::HistoryNotFound.category(), ErrorCategory::Student);
        assert_eq!(
            ErrorCode::PaymentExceedsDue.category(),
            ErrorCategory::Payment
        );
        assert_eq!(ErrorCode::ShiftNotFound.category(), ErrorCategory::Seat);
        assert_eq!(ErrorCode::EmailInUse.category(), ErrorCategory::User);
        assert_eq!(ErrorCode::DatabaseError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serde() {
        let json = serde_json::to_string(&ErrorCategory::Payment).unwrap();
        assert_eq!(json, "\"payment\"");

        let category: ErrorCategory = serde_json::from_str("\"seat\"").unwrap();
        assert_eq!(category, ErrorCategory::Seat);
        assert_eq!(category.name(), "seat");
    }
}
