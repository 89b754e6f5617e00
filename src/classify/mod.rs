//! Category classification for rows that were entered without a category.
//!
//! The `Classifier` trait is the seam between the form and whatever assigns categories. In
//! production that is the HTTP classification service; in test mode it is an in-memory,
//! rule-based classifier so that the whole app can run top-to-bottom without a server.

mod auto_cat;
mod http;

use crate::model::{Category, FieldErrors, TransactionRow};
use crate::{Config, Result};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

pub use auto_cat::{AutoCatClassifier, AutoCatRule};
pub use http::HttpClassifier;

/// Message used when the service rejects a request without saying why.
pub(crate) const CLASSIFICATION_FAILED: &str = "Category classification failed.";

/// Assigns categories to transactions.
#[async_trait::async_trait]
pub trait Classifier: Send + Sync {
    /// Sends `transactions` for classification and returns the service's predictions.
    async fn classify(
        &self,
        transactions: &[PendingTransaction],
    ) -> std::result::Result<Vec<ClassifiedTransaction>, ClassifyError>;
}

/// Why a classification request failed.
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    /// The service answered with a non-success status.
    #[error("{message}")]
    Rejected {
        status: Option<u16>,
        message: String,
    },
    /// The request could not be sent or its response could not be read.
    #[error("Failed to connect to backend.")]
    Connection(#[from] reqwest::Error),
    /// The service answered with a non-success status and a body that is not JSON, e.g. an HTML
    /// error page from a proxy.
    #[error("Failed to connect to backend.")]
    Unreadable {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
}

/// A row as it is sent to the classification service.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PendingTransaction {
    pub date: String,
    pub description: String,
    pub amount: String,
    pub category: String,
    pub errors: FieldErrors,
}

impl From<&TransactionRow> for PendingTransaction {
    fn from(row: &TransactionRow) -> Self {
        Self {
            date: row.date.clone(),
            description: row.description.clone(),
            amount: row.amount.clone(),
            category: row.category.map(|c| c.to_string()).unwrap_or_default(),
            errors: row.errors.clone(),
        }
    }
}

/// A prediction returned by the classification service. The service echoes the submitted fields,
/// which are used to match the prediction back to its row.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ClassifiedTransaction {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: String,
    pub predicted_category: String,
}

impl ClassifiedTransaction {
    fn matches(&self, row: &TransactionRow) -> bool {
        self.description == row.description && self.amount == row.amount && self.date == row.date
    }
}

/// The request body: `{ "transactions": [...] }`.
#[derive(Debug, Serialize)]
pub(crate) struct ClassifyRequest<'a> {
    pub(crate) transactions: &'a [PendingTransaction],
}

/// The success body: `{ "classified": [...] }`.
#[derive(Debug, Deserialize)]
pub(crate) struct ClassifyResponse {
    pub(crate) classified: Vec<ClassifiedTransaction>,
}

/// The failure body: `{ "error": "..." }`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: Option<String>,
}

/// True for rows that should be sent for classification.
pub(crate) fn needs_classification(row: &TransactionRow) -> bool {
    row.category.is_none() && !row.description.is_empty()
}

/// Copies predicted categories onto uncategorized rows whose (description, amount, date) exactly
/// match a prediction. Rows without a match, and predictions naming an unknown category, leave
/// the row untouched. Returns the number of rows that received a category.
pub(crate) fn apply_predictions<'a>(
    rows: impl IntoIterator<Item = &'a mut TransactionRow>,
    classified: &[ClassifiedTransaction],
) -> usize {
    let mut applied = 0;
    for row in rows.into_iter().filter(|row| row.category.is_none()) {
        let Some(prediction) = classified.iter().find(|c| c.matches(row)) else {
            trace!("No prediction for '{}'", row.description);
            continue;
        };
        match prediction.predicted_category.parse::<Category>() {
            Ok(category) => {
                row.category = Some(category);
                applied += 1;
            }
            Err(_) => warn!(
                "Ignoring unknown predicted category '{}' for '{}'",
                prediction.predicted_category, row.description
            ),
        }
    }
    applied
}

/// Which `Classifier` the app uses.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    /// Use the HTTP classification service named in the config.
    #[default]
    Http,
    /// Use the in-memory `AutoCatClassifier`.
    Testing,
}

impl Mode {
    /// When `TXN_SHEET_IN_TEST_MODE` is set and non-empty the mode is `Mode::Testing`, otherwise
    /// it is `Mode::Http`.
    pub fn from_env() -> Self {
        match std::env::var("TXN_SHEET_IN_TEST_MODE") {
            Ok(value) if !value.is_empty() => Mode::Testing,
            _ => Mode::Http,
        }
    }
}

/// Creates the `Classifier` for `mode`.
pub(crate) fn classifier(config: &Config, mode: Mode) -> Result<Box<dyn Classifier>> {
    Ok(match mode {
        Mode::Http => Box::new(HttpClassifier::new(
            config.classify_url().clone(),
            config.classify_timeout(),
        )?),
        Mode::Testing => Box::new(AutoCatClassifier::default()),
    })
}
