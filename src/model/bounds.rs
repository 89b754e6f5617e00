use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The date format used by date inputs, bounds and exported rows.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// The min/max date window. Both must be set before rows can be edited, and together they
/// constrain the valid range of each row's `date`.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct SessionBounds {
    min_date: Option<NaiveDate>,
    max_date: Option<NaiveDate>,
}

impl SessionBounds {
    pub fn new(min_date: Option<NaiveDate>, max_date: Option<NaiveDate>) -> Self {
        Self { min_date, max_date }
    }

    /// Parses bounds from the raw values of the two date inputs. Empty strings leave a bound unset.
    pub fn parse(min_date: &str, max_date: &str) -> crate::Result<Self> {
        Ok(Self {
            min_date: parse_bound(min_date).context("Invalid Min Date")?,
            max_date: parse_bound(max_date).context("Invalid Max Date")?,
        })
    }

    pub fn min_date(&self) -> Option<NaiveDate> {
        self.min_date
    }

    pub fn max_date(&self) -> Option<NaiveDate> {
        self.max_date
    }

    /// True when both bounds are set, which is what unlocks row edits.
    pub fn is_set(&self) -> bool {
        self.min_date.is_some() && self.max_date.is_some()
    }
}

fn parse_bound(value: &str) -> crate::Result<Option<NaiveDate>> {
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(Some)
        .with_context(|| format!("'{value}' is not a YYYY-MM-DD date"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_both() {
        let bounds = SessionBounds::parse("2024-01-01", "2024-12-31").unwrap();
        assert!(bounds.is_set());
        assert_eq!(
            NaiveDate::from_ymd_opt(2024, 1, 1),
            bounds.min_date()
        );
    }

    #[test]
    fn test_parse_partial() {
        let bounds = SessionBounds::parse("", "2024-12-31").unwrap();
        assert!(!bounds.is_set());
        assert!(bounds.min_date().is_none());
        assert!(!SessionBounds::default().is_set());
    }

    #[test]
    fn test_parse_bad_date() {
        let err = SessionBounds::parse("01/02/2024", "").unwrap_err();
        assert!(format!("{err:#}").contains("Invalid Min Date"));
    }
}
