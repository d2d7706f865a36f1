//! Fee and payment arithmetic
//!
//! All money is `Decimal` rounded to 2 places. `amount_paid` and `due_amount`
//! are never taken from a client: they are derived from `cash`, `online` and
//! `total_fee` on every write.

use rust_decimal::{Decimal, RoundingStrategy};
use shared::error::{AppError, ErrorCode};
use shared::models::{FormField, PaymentMethod, PaymentRequest};

const MONEY_DP: u32 = 2;

/// Exclusive upper bound of a `NUMERIC(12,2)` column
pub const MONEY_LIMIT: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0);

/// Round to cents, half away from zero
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Money columns shared by students and history snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Fees {
    pub total_fee: Decimal,
    pub cash: Decimal,
    pub online: Decimal,
    pub security_money: Decimal,
}

impl Fees {
    pub fn amount_paid(&self) -> Decimal {
        self.cash + self.online
    }

    pub fn due_amount(&self) -> Decimal {
        self.total_fee - self.amount_paid()
    }

    /// Validate the money fields of a student payload.
    ///
    /// Missing fields count as zero. `amount_paid` is optional and, when
    /// supplied, must agree with `cash + online`.
    pub fn from_form(
        total_fee: FormField<Decimal>,
        amount_paid: FormField<Decimal>,
        cash: FormField<Decimal>,
        online: FormField<Decimal>,
        security_money: FormField<Decimal>,
    ) -> Result<Self, AppError> {
        let fees = Self {
            total_fee: money_field(total_fee, "Total fee")?,
            cash: money_field(cash, "Cash")?,
            online: money_field(online, "Online payment")?,
            security_money: money_field(security_money, "Security money")?,
        };

        if !amount_paid.is_missing() {
            let claimed = money_field(amount_paid, "Amount paid")?;
            if claimed != fees.amount_paid() {
                return Err(AppError::new(ErrorCode::AmountPaidMismatch)
                    .with_detail("amount_paid", claimed.to_string())
                    .with_detail("expected", fees.amount_paid().to_string()));
            }
        }

        if fees.due_amount() < Decimal::ZERO {
            return Err(AppError::new(ErrorCode::FeeOverpaid));
        }

        Ok(fees)
    }
}

fn money_field(field: FormField<Decimal>, label: &str) -> Result<Decimal, AppError> {
    let invalid =
        || AppError::with_message(ErrorCode::FeeInvalid, format!("{label} must be a valid non-negative number"));
    match field.into_option() {
        Ok(None) => Ok(Decimal::ZERO),
        Ok(Some(value)) if value >= Decimal::ZERO => {
            let value = round_money(value);
            if value >= MONEY_LIMIT {
                return Err(AppError::with_message(ErrorCode::FeeInvalid, format!("{label} is too large"))
                    .with_detail("max", "9999999999.99"));
            }
            Ok(value)
        }
        Ok(Some(_)) | Err(_) => Err(invalid()),
    }
}

/// Validated settlement request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payment {
    pub amount: Decimal,
    pub method: PaymentMethod,
}

impl Payment {
    /// Amount must be a JSON number above zero; method must be `cash` or `online`.
    pub fn parse(req: &PaymentRequest) -> Result<Self, AppError> {
        let amount = req
            .payment_amount
            .as_ref()
            .and_then(serde_json::Value::as_f64)
            .and_then(|v| Decimal::try_from(v).ok())
            .map(round_money)
            .filter(|v| *v > Decimal::ZERO)
            .ok_or_else(|| AppError::new(ErrorCode::PaymentInvalidAmount))?;

        let method = req
            .payment_method
            .as_deref()
            .and_then(PaymentMethod::parse)
            .ok_or_else(|| AppError::new(ErrorCode::PaymentInvalidMethod))?;

        Ok(Self { amount, method })
    }

    /// Apply this payment to `fees`; overpaying the due is rejected.
    pub fn apply(&self, fees: Fees) -> Result<Fees, AppError> {
        if self.amount <= Decimal::ZERO {
            return Err(AppError::new(ErrorCode::PaymentInvalidAmount));
        }

        let mut next = fees;
        match self.method {
            PaymentMethod::Cash => next.cash += self.amount,
            PaymentMethod::Online => next.online += self.amount,
        }

        if next.due_amount() < Decimal::ZERO {
            return Err(AppError::new(ErrorCode::PaymentExceedsDue)
                .with_detail("due_amount", fees.due_amount().to_string()));
        }
        Ok(next)
    }
}
