//! Spreadsheet export of committed rows.
//!
//! Rows are first laid out as an `ExportSheet`, a plain description of every cell and its style,
//! and then written to an `.xlsx` file with `rust_xlsxwriter`.

use crate::model::{Amount, SessionBounds, TransactionRow};
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, XlsxError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Name of the worksheet in the exported workbook.
pub const SHEET_NAME: &str = "Transactions";

/// Default file name of the exported workbook.
pub const EXPORT_FILE_NAME: &str = "transactions.xlsx";

/// Fewest committed rows that can be exported.
pub const MIN_EXPORT_ROWS: usize = 5;

const HEADERS: [&str; 4] = ["Date", "Description", "Amount", "Category"];

/// Bold white text on blue, centered.
const HEADER_STYLE: CellStyle = CellStyle {
    bold: true,
    font_rgb: 0xFFFFFF,
    fill_rgb: 0x4472C4,
    centered: true,
};

/// Why an export did not produce a file.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Please add at least 5 valid transactions before exporting.")]
    TooFewRows { found: usize },
    #[error("Please correct all validation errors before exporting.")]
    ValidationErrors,
    #[error("Please set both Min Date and Max Date before exporting.")]
    BoundsUnset,
    #[error("Unable to write the workbook to {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: XlsxError,
    },
}

/// The result of a successful export.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ExportSummary {
    /// Where the workbook was written.
    pub path: PathBuf,
    /// Number of transaction rows written, excluding the header.
    pub rows: usize,
}

/// Checks the export preconditions, in order, against the committed rows.
pub(crate) fn check_preconditions(
    rows: &[TransactionRow],
    bounds: &SessionBounds,
) -> Result<(), ExportError> {
    if rows.len() < MIN_EXPORT_ROWS {
        return Err(ExportError::TooFewRows { found: rows.len() });
    }
    if rows.iter().any(TransactionRow::has_errors) {
        return Err(ExportError::ValidationErrors);
    }
    if !bounds.is_set() {
        return Err(ExportError::BoundsUnset);
    }
    Ok(())
}

/// Writes `rows` to a workbook at `path` after checking the export preconditions. Nothing is
/// written when a precondition fails.
pub(crate) fn export_to_excel(
    rows: &[TransactionRow],
    bounds: &SessionBounds,
    path: &Path,
) -> Result<ExportSummary, ExportError> {
    check_preconditions(rows, bounds)?;
    let sheet = ExportSheet::from_rows(rows);
    sheet.save(path).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Wrote {} row(s) to {}", rows.len(), path.display());
    Ok(ExportSummary {
        path: path.to_path_buf(),
        rows: rows.len(),
    })
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct CellStyle {
    bold: bool,
    font_rgb: u32,
    fill_rgb: u32,
    centered: bool,
}

impl CellStyle {
    fn to_format(self) -> Format {
        let mut format = Format::new()
            .set_font_color(Color::RGB(self.font_rgb))
            .set_background_color(Color::RGB(self.fill_rgb));
        if self.bold {
            format = format.set_bold();
        }
        if self.centered {
            format = format.set_align(FormatAlign::Center);
        }
        format
    }
}

#[derive(Debug, Clone, PartialEq)]
enum CellValue {
    Text(String),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq)]
struct Cell {
    value: CellValue,
    style: Option<CellStyle>,
}

impl Cell {
    fn text(value: impl Into<String>) -> Self {
        Self {
            value: CellValue::Text(value.into()),
            style: None,
        }
    }
}

/// Every cell of the exported worksheet, header first.
#[derive(Debug, Clone, PartialEq)]
struct ExportSheet {
    rows: Vec<Vec<Cell>>,
}

impl ExportSheet {
    fn from_rows(rows: &[TransactionRow]) -> Self {
        let header = HEADERS
            .iter()
            .map(|h| Cell {
                value: CellValue::Text(h.to_string()),
                style: Some(HEADER_STYLE),
            })
            .collect();

        let mut sheet_rows = vec![header];
        for row in rows {
            // Validated amounts always parse; anything else is written as typed.
            let amount = match Amount::from_str(row.amount()) {
                Ok(amount) => Cell {
                    value: CellValue::Number(amount.to_f64()),
                    style: None,
                },
                Err(_) => Cell::text(row.amount()),
            };
            sheet_rows.push(vec![
                Cell::text(row.date()),
                Cell::text(row.description()),
                amount,
                Cell::text(row.category().map(|c| c.to_string()).unwrap_or_default()),
            ]);
        }
        Self { rows: sheet_rows }
    }

    fn to_workbook(&self) -> Result<Workbook, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        for (row_ix, row) in self.rows.iter().enumerate() {
            let r = row_ix as u32;
            for (col_ix, cell) in row.iter().enumerate() {
                let c = col_ix as u16;
                match (&cell.value, cell.style) {
                    (CellValue::Text(s), Some(style)) => {
                        worksheet.write_string_with_format(r, c, s, &style.to_format())?;
                    }
                    (CellValue::Text(s), None) => {
                        worksheet.write_string(r, c, s)?;
                    }
                    (CellValue::Number(n), Some(style)) => {
                        worksheet.write_number_with_format(r, c, *n, &style.to_format())?;
                    }
                    (CellValue::Number(n), None) => {
                        worksheet.write_number(r, c, *n)?;
                    }
                }
            }
        }
        Ok(workbook)
    }

    fn save(&self, path: &Path) -> Result<(), XlsxError> {
        let mut workbook = self.to_workbook()?;
        workbook.save(path)
    }
}
