//! Lenient deserialization for form-driven payloads
//!
//! The web client posts form state as JSON, so numeric fields may arrive as
//! numbers, numeric strings or empty strings. [`FormField`] keeps whatever
//! failed to parse so handlers can answer with a field-specific message
//! instead of a generic JSON rejection.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use std::fmt;
use std::marker::PhantomData;

/// A single form value: absent, parsed, or rejected with its raw text
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormField<T> {
    /// Missing, `null` or an empty string
    #[default]
    Missing,
    Value(T),
    /// Present but unparseable; holds the raw input for error messages
    Invalid(String),
}

impl<T> FormField<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// `Ok(None)` when missing, `Err(raw)` when invalid
    pub fn into_option(self) -> Result<Option<T>, String> {
        match self {
            Self::Missing => Ok(None),
            Self::Value(v) => Ok(Some(v)),
            Self::Invalid(raw) => Err(raw),
        }
    }
}

impl<T> From<T> for FormField<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

/// Types that can be read out of a loosely typed form value
pub trait FormValue: Sized {
    fn from_text(text: &str) -> Option<Self>;

    fn from_i64(_value: i64) -> Option<Self> {
        None
    }

    fn from_f64(_value: f64) -> Option<Self> {
        None
    }
}

impl FormValue for i64 {
    fn from_text(text: &str) -> Option<Self> {
        text.parse().ok()
    }

    fn from_i64(value: i64) -> Option<Self> {
        Some(value)
    }

    fn from_f64(value: f64) -> Option<Self> {
        let in_range = value >= i64::MIN as f64 && value <= i64::MAX as f64;
        (value.fract() == 0.0 && in_range).then_some(value as i64)
    }
}

impl FormValue for Decimal {
    fn from_text(text: &str) -> Option<Self> {
        text.parse().ok()
    }

    fn from_i64(value: i64) -> Option<Self> {
        Some(Decimal::from(value))
    }

    fn from_f64(value: f64) -> Option<Self> {
        Decimal::try_from(value).ok()
    }
}

impl FormValue for NaiveDate {
    /// Accepts `YYYY-MM-DD` and full ISO-8601 timestamps (date part only)
    fn from_text(text: &str) -> Option<Self> {
        let date = text.get(..10).unwrap_or(text);
        NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
    }
}

impl<'de, T: FormValue> Deserialize<'de> for FormField<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FieldVisitor<T>(PhantomData<T>);

        impl<T> FieldVisitor<T> {
            fn parsed(value: Option<T>, raw: impl ToString) -> FormField<T> {
                match value {
                    Some(v) => FormField::Value(v),
                    None => FormField::Invalid(raw.to_string()),
                }
            }
        }

        impl<'de, T: FormValue> Visitor<'de> for FieldVisitor<T> {
            type Value = FormField<T>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a number, a string or null")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(FormField::Missing)
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(FormField::Missing)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                deserializer.deserialize_any(self)
            }

            fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
                Ok(FormField::Invalid(value.to_string()))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
                Ok(Self::parsed(T::from_i64(value), value))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
                let converted = i64::try_from(value).ok().and_then(T::from_i64);
                Ok(Self::parsed(converted, value))
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
                Ok(Self::parsed(T::from_f64(value), value))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Ok(FormField::Missing);
                }
                Ok(Self::parsed(T::from_text(trimmed), trimmed))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                while seq.next_element::<de::IgnoredAny>()?.is_some() {}
                Ok(FormField::Invalid("[array]".to_string()))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                while map
                    .next_entry::<de::IgnoredAny, de::IgnoredAny>()?
                    .is_some()
                {}
                Ok(FormField::Invalid("[object]".to_string()))
            }
        }

        deserializer.deserialize_any(FieldVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Form {
        #[serde(default)]
        id: FormField<i64>,
        #[serde(default)]
        fee: FormField<Decimal>,
        #[serde(default)]
        start: FormField<NaiveDate>,
    }

    fn parse(json: &str) -> Form {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn missing_null_and_blank_are_all_missing() {
        let form = parse(r#"{"fee": null, "start": "  "}"#);
        assert!(form.id.is_missing());
        assert!(form.fee.is_missing());
        assert!(form.start.is_missing());
    }

    #[test]
    fn numbers_and_numeric_strings_parse() {
        let form = parse(r#"{"id": "42", "fee": 1200.5, "start": "2024-03-01"}"#);
        assert_eq!(form.id, FormField::Value(42));
        assert_eq!(form.fee, FormField::Value(Decimal::new(12005, 1)));
        assert_eq!(
            form.start,
            FormField::Value(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );

        let form = parse(r#"{"id": 7.0, "fee": "300"}"#);
        assert_eq!(form.id, FormField::Value(7));
        assert_eq!(form.fee, FormField::Value(Decimal::from(300)));
    }

    #[test]
    fn iso_timestamps_keep_the_date_part() {
        let form = parse(r#"{"start": "2024-03-01T00:00:00.000Z"}"#);
        assert_eq!(
            form.start,
            FormField::Value(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
    }

    #[test]
    fn garbage_is_kept_as_invalid() {
        let form = parse(r#"{"id": "abc", "fee": true, "start": "01/03/2024"}"#);
        assert_eq!(form.id, FormField::Invalid("abc".into()));
        assert_eq!(form.fee, FormField::Invalid("true".into()));
        assert_eq!(form.start.into_option(), Err("01/03/2024".to_string()));

        let form = parse(r#"{"id": 1.5}"#);
        assert_eq!(form.id, FormField::Invalid("1.5".into()));
    }
}
