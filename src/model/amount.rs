//! Amount type for parsing the string-encoded amounts typed into the form.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles
//! parsing values that may or may not include a dollar sign and commas.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents a dollar amount parsed from a row's `amount` field.
///
/// The row itself keeps the raw string the user typed; `Amount` exists so that validation and
/// export can reason about the numeric value.
///
/// # Examples
///
/// ```
/// # use txn_sheet::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("$1,250.00").unwrap();
/// let b = Amount::from_str("1250").unwrap();
/// assert_eq!(a, b);
/// assert!(!a.is_negative());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    value: Decimal,
}

impl Amount {
    pub const fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns true if the amount is strictly less than zero. `-0` is not negative.
    pub fn is_negative(&self) -> bool {
        self.value < Decimal::ZERO
    }

    /// The value as a float, for spreadsheet cells.
    pub fn to_f64(&self) -> f64 {
        self.value.to_f64().unwrap_or_default()
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub enum AmountError {
    /// The string is not a number.
    Invalid(rust_decimal::Error),
    /// The string is a number too large in magnitude to represent. `negative` is its sign.
    OutOfRange { negative: bool },
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Invalid(e) => Debug::fmt(e, f),
            AmountError::OutOfRange { negative } => {
                write!(f, "OutOfRange {{ negative: {negative} }}")
            }
        }
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Invalid(e) => Display::fmt(e, f),
            AmountError::OutOfRange { .. } => f.write_str("The amount is out of range"),
        }
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AmountError::Invalid(e) => Some(e),
            AmountError::OutOfRange { .. } => None,
        }
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        // Remove dollar sign if present: "-$50.00", "$50.00"
        let without_dollar = if let Some(after_minus) = trimmed.strip_prefix('-') {
            match after_minus.strip_prefix('$') {
                Some(after_dollar) => format!("-{after_dollar}"),
                None => trimmed.to_string(),
            }
        } else {
            trimmed.strip_prefix('$').unwrap_or(trimmed).to_string()
        };

        // Remove commas (thousand separators)
        let without_commas = without_dollar.replace(',', "");

        match Decimal::from_str(&without_commas) {
            Ok(value) => Ok(Amount { value }),
            Err(e) => match without_commas.parse::<f64>() {
                // f64 also accepts "inf" and "NaN", which are not amounts.
                Ok(float) if without_commas.bytes().any(|b| b.is_ascii_digit()) => {
                    Err(AmountError::OutOfRange {
                        negative: float.is_sign_negative(),
                    })
                }
                _ => Err(AmountError::Invalid(e)),
            },
        }
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.value, f)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}
