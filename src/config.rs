//! Configuration file handling for txn-sheet.
//!
//! The configuration file is stored at `$TXN_SHEET_HOME/config.json` and contains the URL of the
//! classification service, an optional request timeout and the directory exports are written to.

use crate::export::EXPORT_FILE_NAME;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const APP_NAME: &str = "txn-sheet";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const EXPORTS: &str = "exports";
pub(crate) const DEFAULT_CLASSIFY_URL: &str = "http://localhost:8000/api/classify/";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$TXN_SHEET_HOME` and from there it loads `$TXN_SHEET_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    classify_url: Url,
}

impl Config {
    /// Creates the home directory and an initial `config.json` file.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of data directory, e.g. `$HOME/txn-sheet`
    /// - `classify_url` - The classification endpoint. Defaults to
    ///   `http://localhost:8000/api/classify/` when `None`.
    ///
    /// # Errors
    /// - Returns an error if the URL is invalid or any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>, classify_url: Option<&str>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the txn-sheet home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let classify_url = parse_classify_url(classify_url.unwrap_or(DEFAULT_CLASSIFY_URL))?;
        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            classify_url: classify_url.to_string(),
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        let config = Self {
            root,
            config_path,
            config_file,
            classify_url,
        };
        utils::make_dir(config.export_dir()).await?;
        Ok(config)
    }

    /// This will
    /// - validate that the home directory and the config file exist
    /// - load the config file
    /// - return the loaded configuration object
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The txn-sheet home directory is missing, run 'txn-sheet init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}', run 'txn-sheet init' first",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let classify_url = parse_classify_url(&config_file.classify_url)?;

        Ok(Self {
            root,
            config_path,
            config_file,
            classify_url,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn classify_url(&self) -> &Url {
        &self.classify_url
    }

    /// The classification request timeout. `None` means requests wait indefinitely.
    pub fn classify_timeout(&self) -> Option<Duration> {
        self.config_file.classify_timeout_secs.map(Duration::from_secs)
    }

    /// Returns the configured export directory, resolving a relative path against the home
    /// directory.
    pub fn export_dir(&self) -> PathBuf {
        let p = self.config_file.export_dir();
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }

    /// Where `export` writes when no output path is given.
    pub fn default_export_path(&self) -> PathBuf {
        self.export_dir().join(EXPORT_FILE_NAME)
    }
}

fn parse_classify_url(s: &str) -> Result<Url> {
    let url = Url::parse(s).with_context(|| format!("Invalid classify URL '{s}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("The classify URL must use http or https, got '{s}'")
    }
    Ok(url)
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "txn-sheet",
///   "config_version": 1,
///   "classify_url": "http://localhost:8000/api/classify/",
///   "classify_timeout_secs": 30,
///   "export_dir": "exports"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "txn-sheet"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// URL of the classification endpoint
    classify_url: String,

    /// Optional request timeout for classification, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    classify_timeout_secs: Option<u64>,

    /// Directory for exported workbooks (optional, relative to the home directory or absolute)
    /// Defaults to $TXN_SHEET_HOME/exports if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    export_dir: Option<PathBuf>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            classify_url: DEFAULT_CLASSIFY_URL.to_string(),
            classify_timeout_secs: None,
            export_dir: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path, data)
            .await
            .context("Unable to write config file")
    }

    fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(EXPORTS))
    }
}
