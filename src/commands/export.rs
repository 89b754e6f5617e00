//! The `txn-sheet export` command: types the rows of a CSV file into a form, one `add_row` per
//! record, then exports the committed rows to a workbook.

use crate::args::ExportArgs;
use crate::classify::{self, Mode};
use crate::commands::Out;
use crate::form::{AddRow, Form};
use crate::import::{self, CsvRecord};
use crate::model::{Field, SessionBounds, TransactionRow};
use crate::notify::LogNotifier;
use crate::{utils, Config, ExportSummary, Result};
use anyhow::{bail, Context};
use std::sync::Arc;
use tracing::debug;

/// Runs the form over every record in `args.input()` and writes the workbook.
///
/// # Errors
/// - The CSV cannot be read or parsed.
/// - A record fails validation or classification fails; nothing is written in either case.
/// - The export preconditions are not met or the file cannot be written.
pub async fn export(config: Config, mode: Mode, args: ExportArgs) -> Result<Out<ExportSummary>> {
    let input = args.input();
    let records = import::read_records(input).await?;
    debug!("Read {} record(s) from {}", records.len(), input.display());

    let mut form = Form::new(
        classify::classifier(&config, mode)?,
        Arc::new(LogNotifier),
    );
    form.set_bounds(SessionBounds::new(
        Some(args.min_date()),
        Some(args.max_date()),
    ));

    for (ix, record) in records.iter().enumerate() {
        let line = ix + 2;
        enter_record(&mut form, record)
            .with_context(|| format!("Unable to enter the record on line {line}"))?;
        match form.add_row().await {
            AddRow::Added { classified } => {
                debug!("Added line {line}, {classified} row(s) classified")
            }
            AddRow::Invalid => bail!(
                "The record on line {line} is invalid: {}",
                describe_errors(form.open_row())
            ),
            AddRow::ClassificationFailed => {
                bail!("Category classification failed while adding line {line}")
            }
        }
    }

    let path = match args.out() {
        Some(out) => out.to_path_buf(),
        None => config.default_export_path(),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        utils::make_dir(parent).await?;
    }
    let summary = form.export(&path)?;
    Ok(Out::new(
        format!(
            "Exported {} transaction(s) to {}",
            summary.rows,
            summary.path.display()
        ),
        summary,
    ))
}

fn enter_record(form: &mut Form, record: &CsvRecord) -> Result<()> {
    let open = form.len() - 1;
    form.update_field(open, Field::Date, record.date.as_str())?;
    form.update_field(open, Field::Description, record.description.as_str())?;
    form.update_field(open, Field::Amount, record.amount.as_str())?;
    form.update_field(open, Field::Category, record.category.as_str())
}

fn describe_errors(row: &TransactionRow) -> String {
    Field::VALIDATED
        .iter()
        .map(|field| row.errors().get(*field))
        .filter(|message| !message.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
