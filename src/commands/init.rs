use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the home directory, the exports directory and an initial `config.json` that points at
/// `classify_url`.
///
/// # Errors
/// - Returns an error if `classify_url` is not an http(s) URL or any file operation fails.
pub async fn init(txn_sheet_home: &Path, classify_url: &str) -> Result<Out<()>> {
    let config = Config::create(txn_sheet_home, Some(classify_url))
        .await
        .context("Unable to create the data directory and configs")?;
    Ok(format!(
        "Successfully created the txn-sheet directory at {}",
        config.root().display()
    )
    .into())
}
