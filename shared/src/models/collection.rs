//! Collection Model
//!
//! Collections are read from membership history snapshots. Only the current
//! (non-superseded) snapshot of each enrollment/renewal cycle is reported.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Why a history snapshot was written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotKind {
    Enrollment,
    Revision,
    Renewal,
}

impl SnapshotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enrollment => "enrollment",
            Self::Revision => "revision",
            Self::Renewal => "renewal",
        }
    }
}

/// Settlement channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Online,
}

impl PaymentMethod {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cash" => Some(Self::Cash),
            "online" => Some(Self::Online),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Online => "online",
        }
    }
}

/// One row of the collections report (camelCase for the web client)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CollectionEntry {
    pub history_id: i64,
    pub student_id: i64,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub shift_title: Option<String>,
    pub total_fee: Decimal,
    pub amount_paid: Decimal,
    pub due_amount: Decimal,
    pub cash: Decimal,
    pub online: Decimal,
    pub security_money: Decimal,
    pub remark: Option<String>,
    /// When the snapshot was written
    pub created_at: DateTime<Utc>,
    pub branch_id: Option<i64>,
    pub branch_name: Option<String>,
}

/// `PUT /collections/:historyId` payload
///
/// `payment_amount` is kept raw: only a JSON number is accepted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PaymentRequest {
    pub payment_amount: Option<serde_json::Value>,
    pub payment_method: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_method_parse_is_exact() {
        assert_eq!(PaymentMethod::parse("cash"), Some(PaymentMethod::Cash));
        assert_eq!(PaymentMethod::parse("online"), Some(PaymentMethod::Online));
        assert_eq!(PaymentMethod::parse("Cash"), None);
        assert_eq!(PaymentMethod::parse("card"), None);
    }

    #[test]
    fn collection_entry_uses_camel_case() {
        let entry = CollectionEntry {
            history_id: 4,
            student_id: 2,
            name: Some("Meena".into()),
            phone: None,
            shift_title: Some("Morning".into()),
            total_fee: Decimal::from(1000),
            amount_paid: Decimal::from(1000),
            due_amount: Decimal::ZERO,
            cash: Decimal::from(600),
            online: Decimal::from(400),
            security_money: Decimal::ZERO,
            remark: None,
            created_at: Utc::now(),
            branch_id: Some(1),
            branch_name: Some("Main".into()),
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["historyId"], 4);
        assert_eq!(json["shiftTitle"], "Morning");
        assert_eq!(json["dueAmount"], 0.0);
        assert!(json.get("history_id").is_none());
    }
}
