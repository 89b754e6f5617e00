//! The transaction form: an ordered list of committed rows followed by one open row.
//!
//! The open row is where new data is typed. `add_row` validates everything, asks the classifier
//! to fill in missing categories, then commits the open row and starts a fresh one. Because the
//! open row is held separately from the committed rows, the form can never be empty.

use crate::classify::{apply_predictions, needs_classification, Classifier, PendingTransaction};
use crate::export::{self, ExportError, ExportSummary};
use crate::model::{Field, SessionBounds, TransactionRow};
use crate::notify::{Notifier, Severity};
use crate::Result;
use anyhow::{bail, ensure, Context};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

const AUTO_FILLED: &str = "Category auto-filled for empty rows!";
const EXPORTED: &str = "Exported successfully!";

/// The role a row plays in the form.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowRole {
    /// A row that has been added with `add_row`. Only committed rows are exported.
    Committed,
    /// The trailing row used to enter new data.
    Open,
}

/// The outcome of `Form::add_row`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AddRow {
    /// The open row was committed and a new open row appended. `classified` rows received a
    /// predicted category.
    Added { classified: usize },
    /// At least one field is invalid. The messages are stored on the rows and nothing else
    /// changed.
    Invalid,
    /// The classifier failed. The failure was reported through the notifier and the rows are
    /// unchanged.
    ClassificationFailed,
}

/// A row together with its position and role, for display.
#[derive(Debug, Clone, Serialize)]
pub struct RowView {
    pub index: usize,
    pub role: RowRole,
    #[serde(flatten)]
    pub row: TransactionRow,
}

/// A snapshot of the whole form, for display.
#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    pub rows: Vec<RowView>,
}

/// The state of one form session.
pub struct Form {
    bounds: SessionBounds,
    committed: Vec<TransactionRow>,
    open: TransactionRow,
    classifier: Box<dyn Classifier>,
    notifier: Arc<dyn Notifier + Send + Sync>,
}

impl Form {
    /// Creates a form with a single blank open row and no session bounds.
    pub fn new(classifier: Box<dyn Classifier>, notifier: Arc<dyn Notifier + Send + Sync>) -> Self {
        Self {
            bounds: SessionBounds::default(),
            committed: Vec::new(),
            open: TransactionRow::default(),
            classifier,
            notifier,
        }
    }

    pub fn bounds(&self) -> &SessionBounds {
        &self.bounds
    }

    /// Sets the session bounds and re-validates the dates of committed rows against them.
    pub fn set_bounds(&mut self, bounds: SessionBounds) {
        if let (Some(min), Some(max)) = (bounds.min_date(), bounds.max_date()) {
            if min > max {
                warn!("Min Date {min} is after Max Date {max}; every date will be rejected");
            }
        }
        self.bounds = bounds;
        for row in &mut self.committed {
            row.validate_field(Field::Date, &bounds);
        }
    }

    /// The number of rows, including the open row. Never zero.
    pub fn len(&self) -> usize {
        self.committed.len() + 1
    }

    /// The role of the row at `index`, or `None` if there is no such row.
    pub fn role(&self, index: usize) -> Option<RowRole> {
        match index.cmp(&self.committed.len()) {
            std::cmp::Ordering::Less => Some(RowRole::Committed),
            std::cmp::Ordering::Equal => Some(RowRole::Open),
            std::cmp::Ordering::Greater => None,
        }
    }

    pub fn row(&self, index: usize) -> Option<&TransactionRow> {
        match self.role(index)? {
            RowRole::Committed => self.committed.get(index),
            RowRole::Open => Some(&self.open),
        }
    }

    fn row_mut(&mut self, index: usize) -> Option<&mut TransactionRow> {
        match self.role(index)? {
            RowRole::Committed => self.committed.get_mut(index),
            RowRole::Open => Some(&mut self.open),
        }
    }

    /// All rows in order, the open row last.
    pub fn rows(&self) -> impl Iterator<Item = (RowRole, &TransactionRow)> + '_ {
        self.committed
            .iter()
            .map(|row| (RowRole::Committed, row))
            .chain(std::iter::once((RowRole::Open, &self.open)))
    }

    fn rows_mut(&mut self) -> impl Iterator<Item = &mut TransactionRow> + '_ {
        self.committed
            .iter_mut()
            .chain(std::iter::once(&mut self.open))
    }

    pub fn committed(&self) -> &[TransactionRow] {
        &self.committed
    }

    pub fn open_row(&self) -> &TransactionRow {
        &self.open
    }

    pub fn view(&self) -> FormView {
        FormView {
            min_date: self.bounds.min_date(),
            max_date: self.bounds.max_date(),
            rows: self
                .rows()
                .enumerate()
                .map(|(index, (role, row))| RowView {
                    index,
                    role,
                    row: row.clone(),
                })
                .collect(),
        }
    }

    fn ensure_unlocked(&self) -> Result<()> {
        ensure!(
            self.bounds.is_set(),
            "Set both Min Date and Max Date before editing rows"
        );
        Ok(())
    }

    /// Sets one field of the row at `index` and re-validates that field only.
    ///
    /// # Errors
    /// - The session bounds are not both set.
    /// - There is no row at `index`.
    /// - `field` is `Category` and `value` is not a known category.
    pub fn update_field(
        &mut self,
        index: usize,
        field: Field,
        value: impl Into<String>,
    ) -> Result<()> {
        self.ensure_unlocked()?;
        let bounds = self.bounds;
        let len = self.len();
        let row = self
            .row_mut(index)
            .with_context(|| format!("Row {index} does not exist, the form has {len} row(s)"))?;
        row.set_value(field, value, &bounds)
    }

    /// Validates every row, classifies rows that are missing a category, then commits the open
    /// row and appends a new one.
    pub async fn add_row(&mut self) -> AddRow {
        let bounds = self.bounds;
        let mut valid = true;
        for row in self.rows_mut() {
            valid &= row.revalidate(&bounds);
        }
        if !valid {
            debug!("Not adding a row, the form has validation errors");
            return AddRow::Invalid;
        }

        let pending: Vec<PendingTransaction> = self
            .rows()
            .map(|(_, row)| row)
            .filter(|row| needs_classification(row))
            .map(PendingTransaction::from)
            .collect();

        if pending.is_empty() {
            self.commit_open_row();
            return AddRow::Added { classified: 0 };
        }

        match self.classifier.classify(&pending).await {
            Ok(predictions) => {
                let classified = apply_predictions(self.rows_mut(), &predictions);
                info!(
                    "Classified {classified} of {} uncategorized row(s)",
                    pending.len()
                );
                self.commit_open_row();
                self.notifier.show(AUTO_FILLED, Severity::Info);
                AddRow::Added { classified }
            }
            Err(e) => {
                warn!("Classification failed: {e:?}");
                self.notifier.show(&e.to_string(), Severity::Danger);
                AddRow::ClassificationFailed
            }
        }
    }

    fn commit_open_row(&mut self) {
        let row = std::mem::take(&mut self.open);
        self.committed.push(row);
    }

    /// Removes the row at `index`. Deleting the open row resets it to blank, so the form always
    /// keeps at least one row.
    ///
    /// # Errors
    /// - The session bounds are not both set.
    /// - There is no row at `index`.
    pub fn delete_row(&mut self, index: usize) -> Result<()> {
        self.ensure_unlocked()?;
        match self.role(index) {
            Some(RowRole::Committed) => {
                let _ = self.committed.remove(index);
            }
            Some(RowRole::Open) => self.open = TransactionRow::default(),
            None => bail!(
                "Row {index} does not exist, the form has {} row(s)",
                self.len()
            ),
        }
        Ok(())
    }

    /// Exports the committed rows to an `.xlsx` workbook at `path`. Both success and rejection
    /// are reported through the notifier.
    pub fn export(&self, path: &Path) -> std::result::Result<ExportSummary, ExportError> {
        match export::export_to_excel(&self.committed, &self.bounds, path) {
            Ok(summary) => {
                self.notifier.show(EXPORTED, Severity::Success);
                Ok(summary)
            }
            Err(e) => {
                self.notifier.show(&e.to_string(), Severity::Danger);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::EXPORT_FILE_NAME;
    use crate::model::Category;
    use crate::notify::Notifications;
    use crate::test::{Script, ScriptedClassifier};
    use tempfile::TempDir;

    struct Harness {
        form: Form,
        notifications: Arc<Notifications>,
        classifier: ScriptedClassifier,
    }

    fn harness(script: Script) -> Harness {
        let notifications = Arc::new(Notifications::new());
        let classifier = ScriptedClassifier::new(script);
        let form = Form::new(Box::new(classifier.clone()), notifications.clone());
        Harness {
            form,
            notifications,
            classifier,
        }
    }

    fn bounds() -> SessionBounds {
        SessionBounds::parse("2024-01-01", "2024-12-31").unwrap()
    }

    fn fill_open(form: &mut Form, date: &str, description: &str, amount: &str, category: &str) {
        let ix = form.len() - 1;
        form.update_field(ix, Field::Date, date).unwrap();
        form.update_field(ix, Field::Description, description).unwrap();
        form.update_field(ix, Field::Amount, amount).unwrap();
        form.update_field(ix, Field::Category, category).unwrap();
    }

    #[test]
    fn test_new_form_has_one_blank_open_row() {
        let h = harness(Script::Respond(vec![]));
        assert_eq!(1, h.form.len());
        assert_eq!(Some(RowRole::Open), h.form.role(0));
        assert!(h.form.open_row().is_blank());
        assert!(h.form.committed().is_empty());
    }

    #[test]
    fn test_edits_locked_until_bounds_set() {
        let mut h = harness(Script::Respond(vec![]));
        let err = h.form.update_field(0, Field::Description, "Coffee").unwrap_err();
        assert!(err.to_string().contains("Min Date and Max Date"));
        assert!(h.form.delete_row(0).is_err());

        h.form.set_bounds(SessionBounds::parse("2024-01-01", "").unwrap());
        assert!(h.form.update_field(0, Field::Description, "Coffee").is_err());

        h.form.set_bounds(bounds());
        h.form.update_field(0, Field::Description, "Coffee").unwrap();
        assert_eq!("Coffee", h.form.open_row().description());
    }

    #[test]
    fn test_update_field_out_of_range() {
        let mut h = harness(Script::Respond(vec![]));
        h.form.set_bounds(bounds());
        let err = h.form.update_field(3, Field::Amount, "1").unwrap_err();
        assert!(err.to_string().contains("Row 3 does not exist"));
    }

    #[test]
    fn test_update_field_validates_only_that_field() {
        let mut h = harness(Script::Respond(vec![]));
        h.form.set_bounds(bounds());
        h.form.update_field(0, Field::Date, "2025-06-01").unwrap();
        let errors = h.form.open_row().errors();
        assert_eq!("Date must be before 2024-12-31", errors.date);
        assert_eq!("", errors.description);
        assert_eq!("", errors.amount);
    }

    #[tokio::test]
    async fn test_add_row_with_errors_does_not_classify_or_append() {
        let mut h = harness(Script::Respond(vec![]));
        h.form.set_bounds(bounds());
        h.form.update_field(0, Field::Description, "Coffee").unwrap();

        assert_eq!(AddRow::Invalid, h.form.add_row().await);
        assert_eq!(0, h.classifier.calls());
        assert_eq!(1, h.form.len());
        let errors = h.form.open_row().errors();
        assert_eq!("Date is required.", errors.date);
        assert_eq!("Amount is required.", errors.amount);
        assert!(h.notifications.drain().is_empty());
    }

    #[tokio::test]
    async fn test_add_row_without_pending_skips_classifier() {
        let mut h = harness(Script::Respond(vec![]));
        h.form.set_bounds(bounds());
        fill_open(&mut h.form, "2024-01-01", "Coffee", "3.50", "Food");

        assert_eq!(AddRow::Added { classified: 0 }, h.form.add_row().await);
        assert_eq!(0, h.classifier.calls());
        assert_eq!(2, h.form.len());
        assert_eq!(Some(RowRole::Committed), h.form.role(0));
        assert!(h.form.open_row().is_blank());
        assert!(h.notifications.drain().is_empty());
    }

    #[tokio::test]
    async fn test_add_row_applies_predictions() {
        let mut h = harness(Script::Respond(vec![crate::ClassifiedTransaction {
            date: "2024-01-01".into(),
            description: "Coffee".into(),
            amount: "3.50".into(),
            predicted_category: "Food".into(),
        }]));
        h.form.set_bounds(bounds());
        fill_open(&mut h.form, "2024-01-01", "Coffee", "3.50", "");

        assert_eq!(AddRow::Added { classified: 1 }, h.form.add_row().await);
        assert_eq!(1, h.classifier.calls());
        assert_eq!(Some(Category::Food), h.form.committed()[0].category());
        assert_eq!(2, h.form.len());
        assert!(h.form.open_row().is_blank());

        let shown = h.notifications.drain();
        assert_eq!(1, shown.len());
        assert_eq!(AUTO_FILLED, shown[0].message);
        assert_eq!(Severity::Info, shown[0].severity);
    }

    #[tokio::test]
    async fn test_add_row_sends_only_uncategorized_rows() {
        let mut h = harness(Script::Respond(vec![]));
        h.form.set_bounds(bounds());
        fill_open(&mut h.form, "2024-01-01", "Coffee", "3.50", "Food");
        h.form.add_row().await;
        fill_open(&mut h.form, "2024-01-02", "Bus", "2", "");
        h.form.add_row().await;

        let sent = h.classifier.last_request();
        assert_eq!(1, sent.len());
        assert_eq!("Bus", sent[0].description);
        // No prediction matched, the category stays empty but the row is still added.
        assert_eq!(None, h.form.committed()[1].category());
        assert_eq!(3, h.form.len());
    }

    #[tokio::test]
    async fn test_add_row_classification_failure_leaves_rows_unchanged() {
        let mut h = harness(Script::Reject("Model unavailable".into()));
        h.form.set_bounds(bounds());
        fill_open(&mut h.form, "2024-01-01", "Coffee", "3.50", "");

        assert_eq!(AddRow::ClassificationFailed, h.form.add_row().await);
        assert_eq!(1, h.form.len());
        assert_eq!("Coffee", h.form.open_row().description());
        assert_eq!(None, h.form.open_row().category());

        let shown = h.notifications.drain();
        assert_eq!("Model unavailable", shown[0].message);
        assert_eq!(Severity::Danger, shown[0].severity);
    }

    #[tokio::test]
    async fn test_delete_only_row_leaves_blank_row() {
        let mut h = harness(Script::Respond(vec![]));
        h.form.set_bounds(bounds());
        h.form.update_field(0, Field::Amount, "-5").unwrap();
        h.form.update_field(0, Field::Description, "Coffee").unwrap();
        assert!(h.form.open_row().has_errors());

        h.form.delete_row(0).unwrap();
        assert_eq!(1, h.form.len());
        assert!(h.form.open_row().is_blank());
        assert!(!h.form.open_row().has_errors());
    }

    #[tokio::test]
    async fn test_delete_committed_row() {
        let mut h = harness(Script::Respond(vec![]));
        h.form.set_bounds(bounds());
        fill_open(&mut h.form, "2024-01-01", "Coffee", "3.50", "Food");
        h.form.add_row().await;
        fill_open(&mut h.form, "2024-01-02", "Bus", "2", "Transport");
        h.form.add_row().await;
        assert_eq!(3, h.form.len());

        h.form.delete_row(0).unwrap();
        assert_eq!(2, h.form.len());
        assert_eq!("Bus", h.form.committed()[0].description());
        assert!(h.form.delete_row(2).is_err());
    }

    #[tokio::test]
    async fn test_set_bounds_revalidates_committed_dates() {
        let mut h = harness(Script::Respond(vec![]));
        h.form.set_bounds(bounds());
        fill_open(&mut h.form, "2024-06-01", "Coffee", "3.50", "Food");
        h.form.add_row().await;
        assert!(!h.form.committed()[0].has_errors());

        h.form
            .set_bounds(SessionBounds::parse("2024-07-01", "2024-12-31").unwrap());
        assert_eq!(
            "Date must be after 2024-07-01",
            h.form.committed()[0].errors().date
        );
    }

    #[tokio::test]
    async fn test_export_requires_five_committed_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(EXPORT_FILE_NAME);
        let mut h = harness(Script::Respond(vec![]));
        h.form.set_bounds(bounds());
        for _ in 0..4 {
            fill_open(&mut h.form, "2024-01-01", "Coffee", "3.50", "Food");
            h.form.add_row().await;
        }
        // The open row does not count, even when it is filled in.
        fill_open(&mut h.form, "2024-01-01", "Coffee", "3.50", "Food");

        assert!(matches!(
            h.form.export(&path),
            Err(ExportError::TooFewRows { found: 4 })
        ));
        let shown = h.notifications.drain();
        assert_eq!(
            "Please add at least 5 valid transactions before exporting.",
            shown[0].message
        );
        assert!(!path.exists());

        h.form.add_row().await;
        let summary = h.form.export(&path).unwrap();
        assert_eq!(5, summary.rows);
        assert!(path.is_file());
        let shown = h.notifications.drain();
        assert_eq!(EXPORTED, shown[0].message);
        assert_eq!(Severity::Success, shown[0].severity);
    }

    #[test]
    fn test_view() {
        let h = harness(Script::Respond(vec![]));
        let view = h.form.view();
        assert_eq!(1, view.rows.len());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!("open", json["rows"][0]["role"]);
        assert_eq!("", json["rows"][0]["description"]);
        assert!(json["min_date"].is_null());
    }
}
