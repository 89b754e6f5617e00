//! txn-sheet: a transaction-entry form with per-field validation, remote category
//! classification and spreadsheet export.

pub mod args;
mod classify;
pub mod commands;
mod config;
mod error;
mod export;
mod form;
mod import;
mod mcp;
pub mod model;
mod notify;
mod utils;
mod validate;

pub use classify::{
    AutoCatClassifier, AutoCatRule, ClassifiedTransaction, ClassifyError, Classifier,
    HttpClassifier, Mode, PendingTransaction,
};
pub use config::Config;
pub use error::{Error, Result};
pub use export::{ExportError, ExportSummary, EXPORT_FILE_NAME, MIN_EXPORT_ROWS, SHEET_NAME};
pub use form::{AddRow, Form, FormView, RowRole, RowView};
pub use notify::{LogNotifier, Notification, Notifications, Notifier, Severity};
pub use validate::validate;
