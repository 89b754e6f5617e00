//! Reads transaction rows from a CSV file for the `export` command.

use crate::utils;
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

// "Date","Description","Amount","Category"
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct CsvRecord {
    #[serde(default)]
    pub(crate) date: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default)]
    pub(crate) amount: String,
    #[serde(default)]
    pub(crate) category: String,
}

/// Reads every record from the CSV file at `path`. The file must have a header row; the
/// `Category` column may be omitted.
pub(crate) async fn read_records(path: &Path) -> Result<Vec<CsvRecord>> {
    let content = utils::read(path).await?;
    parse_records(&content).with_context(|| format!("Unable to parse CSV at {}", path.display()))
}

fn parse_records(content: &str) -> Result<Vec<CsvRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    let mut records = Vec::new();
    for (ix, result) in rdr.deserialize().enumerate() {
        // Line 1 is the header.
        let record: CsvRecord = result.with_context(|| format!("Bad record on line {}", ix + 2))?;
        records.push(record);
    }
    Ok(records)
}
