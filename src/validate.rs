//! Field-level validation for transaction rows.
//!
//! Validation is a pure function of the field, its raw value and the session bounds. It never
//! fails; a valid value yields an empty message.

use crate::model::{
    Amount, AmountError, Field, SessionBounds, DATE_FORMAT, DESCRIPTION_MAX_CHARS,
};
use chrono::NaiveDate;
use std::str::FromStr;

/// Returns the validation message for `value` in `field`, or an empty string if it is valid.
pub fn validate(field: Field, value: &str, bounds: &SessionBounds) -> String {
    match field {
        Field::Date => validate_date(value, bounds),
        Field::Description => validate_description(value),
        Field::Amount => validate_amount(value),
        Field::Category => String::new(),
    }
}

fn validate_date(value: &str, bounds: &SessionBounds) -> String {
    if value.is_empty() {
        return "Date is required.".into();
    }
    let date = match NaiveDate::parse_from_str(value, DATE_FORMAT) {
        Ok(date) => date,
        Err(_) => return "Date must be in YYYY-MM-DD format.".into(),
    };
    if let Some(min) = bounds.min_date() {
        if date < min {
            return format!("Date must be after {min}");
        }
    }
    if let Some(max) = bounds.max_date() {
        if date > max {
            return format!("Date must be before {max}");
        }
    }
    String::new()
}

fn validate_description(value: &str) -> String {
    if value.is_empty() {
        return "Description is required.".into();
    }
    if value.chars().count() > DESCRIPTION_MAX_CHARS {
        return "Must be under 100 characters.".into();
    }
    String::new()
}

fn validate_amount(value: &str) -> String {
    if value.is_empty() {
        return "Amount is required.".into();
    }
    match Amount::from_str(value) {
        Err(AmountError::OutOfRange { negative: true }) => "Amount cannot be negative.".into(),
        Err(AmountError::OutOfRange { negative: false }) => "Amount is too large.".into(),
        Err(AmountError::Invalid(_)) => "Amount must be a number.".into(),
        Ok(amount) if amount.is_negative() => "Amount cannot be negative.".into(),
        Ok(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> SessionBounds {
        SessionBounds::parse("2024-01-01", "2024-12-31").unwrap()
    }

    #[test]
    fn test_description_required() {
        for b in [bounds(), SessionBounds::default()] {
            assert_eq!(
                "Description is required.",
                validate(Field::Description, "", &b)
            );
        }
    }

    #[test]
    fn test_description_length() {
        let ok = "x".repeat(100);
        let too_long = "x".repeat(101);
        assert_eq!("", validate(Field::Description, &ok, &bounds()));
        assert_eq!(
            "Must be under 100 characters.",
            validate(Field::Description, &too_long, &bounds())
        );
        // characters, not bytes
        let wide = "é".repeat(100);
        assert_eq!("", validate(Field::Description, &wide, &bounds()));
    }

    #[test]
    fn test_amount() {
        let b = bounds();
        assert_eq!("Amount is required.", validate(Field::Amount, "", &b));
        assert_eq!("Amount cannot be negative.", validate(Field::Amount, "-1", &b));
        assert_eq!("", validate(Field::Amount, "0", &b));
        assert_eq!("", validate(Field::Amount, "3.50", &b));
        assert_eq!("", validate(Field::Amount, "$1,000", &b));
    }

    #[test]
    fn test_amount_beyond_decimal_range() {
        let b = bounds();
        assert_eq!(
            "Amount is too large.",
            validate(Field::Amount, "100000000000000000000000000000", &b)
        );
        assert_eq!(
            "Amount cannot be negative.",
            validate(Field::Amount, "-100000000000000000000000000000", &b)
        );
    }

    #[test]
    fn test_amount_not_a_number() {
        assert_eq!(
            "Amount must be a number.",
            validate(Field::Amount, "lots", &bounds())
        );
    }

    #[test]
    fn test_date_required() {
        assert_eq!("Date is required.", validate(Field::Date, "", &bounds()));
    }

    #[test]
    fn test_date_format() {
        assert_eq!(
            "Date must be in YYYY-MM-DD format.",
            validate(Field::Date, "03/15/2024", &bounds())
        );
    }

    #[test]
    fn test_date_range() {
        let b = bounds();
        assert_eq!(
            "Date must be after 2024-01-01",
            validate(Field::Date, "2023-12-31", &b)
        );
        assert_eq!(
            "Date must be before 2024-12-31",
            validate(Field::Date, "2025-01-01", &b)
        );
        assert_eq!("", validate(Field::Date, "2024-01-01", &b));
        assert_eq!("", validate(Field::Date, "2024-12-31", &b));
    }

    #[test]
    fn test_date_without_bounds() {
        assert_eq!(
            "",
            validate(Field::Date, "1999-01-01", &SessionBounds::default())
        );
    }

    #[test]
    fn test_category_always_valid() {
        assert_eq!("", validate(Field::Category, "", &bounds()));
    }
}
