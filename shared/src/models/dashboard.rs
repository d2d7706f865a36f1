//! Dashboard Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Current-month totals shown on the admin dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_collection: Decimal,
    pub total_due: Decimal,
    pub total_expense: Decimal,
    /// `total_collection - total_expense`
    pub profit_loss: Decimal,
}

impl DashboardStats {
    pub fn new(total_collection: Decimal, total_due: Decimal, total_expense: Decimal) -> Self {
        Self {
            total_collection,
            total_due,
            total_expense,
            profit_loss: total_collection - total_expense,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profit_loss_is_collection_minus_expense() {
        let stats = DashboardStats::new(Decimal::from(5000), Decimal::from(800), Decimal::from(6200));
        assert_eq!(stats.profit_loss, Decimal::from(-1200));

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["totalCollection"], 5000.0);
        assert_eq!(json["totalDue"], 800.0);
        assert_eq!(json["profitLoss"], -1200.0);
    }
}
