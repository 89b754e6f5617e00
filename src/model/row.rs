use crate::model::{Category, SessionBounds};
use crate::validate::validate;
use crate::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Longest description, in characters, that passes validation.
pub const DESCRIPTION_MAX_CHARS: usize = 100;

/// The editable inputs of a row.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Date,
    Description,
    Amount,
    Category,
}

serde_plain::derive_display_from_serialize!(Field);
serde_plain::derive_fromstr_from_deserialize!(Field);

impl Field {
    /// The fields that carry validation messages. `Category` is always valid.
    pub const VALIDATED: [Field; 3] = [Field::Date, Field::Description, Field::Amount];
}

/// The current validation message of each validated field. An empty string means valid.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FieldErrors {
    pub date: String,
    pub description: String,
    pub amount: String,
}

impl FieldErrors {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Date => &self.date,
            Field::Description => &self.description,
            Field::Amount => &self.amount,
            Field::Category => "",
        }
    }

    pub(crate) fn set(&mut self, field: Field, message: String) {
        match field {
            Field::Date => self.date = message,
            Field::Description => self.description = message,
            Field::Amount => self.amount = message,
            Field::Category => {}
        }
    }

    pub fn has_any(&self) -> bool {
        !(self.date.is_empty() && self.description.is_empty() && self.amount.is_empty())
    }
}

/// One transaction entry in the form.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TransactionRow {
    pub(crate) date: String,
    pub(crate) description: String,
    pub(crate) amount: String,
    pub(crate) category: Option<Category>,
    pub(crate) errors: FieldErrors,
}

impl TransactionRow {
    /// Creates a row from raw input values. No validation is run.
    pub fn new(
        date: impl Into<String>,
        description: impl Into<String>,
        amount: impl Into<String>,
        category: Option<Category>,
    ) -> Self {
        Self {
            date: date.into(),
            description: description.into(),
            amount: amount.into(),
            category,
            errors: FieldErrors::default(),
        }
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        self.errors.has_any()
    }

    /// True when every input is empty and no error is stored.
    pub fn is_blank(&self) -> bool {
        *self == TransactionRow::default()
    }

    /// The raw value of `field` as it would appear in its input.
    pub fn value(&self, field: Field) -> String {
        match field {
            Field::Date => self.date.clone(),
            Field::Description => self.description.clone(),
            Field::Amount => self.amount.clone(),
            Field::Category => self.category.map(|c| c.to_string()).unwrap_or_default(),
        }
    }

    /// Sets `field` to `value` and re-runs validation for that field only.
    ///
    /// # Errors
    /// - Returns an error, leaving the row unchanged, if `field` is `Category` and `value` is
    ///   neither empty nor one of the known categories.
    pub(crate) fn set_value(
        &mut self,
        field: Field,
        value: impl Into<String>,
        bounds: &SessionBounds,
    ) -> Result<()> {
        let value = value.into();
        match field {
            Field::Date => self.date = value,
            Field::Description => self.description = value,
            Field::Amount => self.amount = value,
            Field::Category => self.category = Category::parse_optional(&value)?,
        }
        self.validate_field(field, bounds);
        Ok(())
    }

    /// Validates `field` against `bounds` and stores the message.
    pub(crate) fn validate_field(&mut self, field: Field, bounds: &SessionBounds) {
        let message = validate(field, &self.value(field), bounds);
        self.errors.set(field, message);
    }

    /// Validates every field and stores the messages. Returns true if the row is valid.
    pub(crate) fn revalidate(&mut self, bounds: &SessionBounds) -> bool {
        for field in Field::VALIDATED {
            self.validate_field(field, bounds);
        }
        !self.has_errors()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> SessionBounds {
        SessionBounds::parse("2024-01-01", "2024-12-31").unwrap()
    }

    #[test]
    fn test_set_value_validates_only_that_field() {
        let mut row = TransactionRow::default();
        row.set_value(Field::Description, "", &bounds()).unwrap();
        assert_eq!("Description is required.", row.errors().description);
        assert_eq!("", row.errors().date);
        assert_eq!("", row.errors().amount);
    }

    #[test]
    fn test_set_value_clears_error() {
        let mut row = TransactionRow::default();
        row.set_value(Field::Amount, "-1", &bounds()).unwrap();
        assert!(row.has_errors());
        row.set_value(Field::Amount, "1", &bounds()).unwrap();
        assert!(!row.has_errors());
        assert_eq!("1", row.amount());
    }

    #[test]
    fn test_set_category() {
        let mut row = TransactionRow::default();
        row.set_value(Field::Category, "Food", &bounds()).unwrap();
        assert_eq!(Some(Category::Food), row.category());
        assert_eq!("Food", row.value(Field::Category));
        row.set_value(Field::Category, "", &bounds()).unwrap();
        assert_eq!(None, row.category());
    }

    #[test]
    fn test_set_unknown_category_leaves_row_unchanged() {
        let mut row = TransactionRow::new("2024-01-01", "Coffee", "3.50", Some(Category::Food));
        assert!(row.set_value(Field::Category, "Snacks", &bounds()).is_err());
        assert_eq!(Some(Category::Food), row.category());
    }

    #[test]
    fn test_revalidate_blank_row() {
        let mut row = TransactionRow::default();
        assert!(!row.revalidate(&bounds()));
        assert_eq!("Date is required.", row.errors().get(Field::Date));
        assert_eq!("Amount is required.", row.errors().get(Field::Amount));
        assert!(!row.is_blank());
    }

    #[test]
    fn test_field_from_str() {
        assert_eq!(Field::Description, "description".parse::<Field>().unwrap());
        assert_eq!("amount", Field::Amount.to_string());
    }
}
