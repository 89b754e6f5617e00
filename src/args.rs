//! These structs provide the CLI interface for the txn-sheet CLI.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// txn-sheet: enter, validate, auto-categorize and export transaction rows.
///
/// Rows are typed into a form one at a time. Each row is validated field by field, rows entered
/// without a category are sent to a classification service, and once at least five rows are in
/// the form they can be exported to an Excel workbook.
///
/// The form can be driven in batch from a CSV file with the export subcommand, or interactively
/// by an AI agent, like Claude or Claude Code, through the mcp subcommand.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the home directory and initialize the configuration file.
    ///
    /// This is the first command you should run. By default the home directory is
    /// $HOME/txn-sheet; pass --txn-sheet-home to put it somewhere else.
    Init(InitArgs),
    /// Type the rows of a CSV file into the form and export them to an Excel workbook.
    Export(ExportArgs),
    /// Run an MCP server over stdio that exposes one form session as tools.
    Mcp(McpArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where configuration and exports are held. Defaults to ~/txn-sheet
    #[arg(long, env = "TXN_SHEET_HOME", default_value_t = default_home())]
    txn_sheet_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, txn_sheet_home: PathBuf) -> Self {
        Self {
            log_level,
            txn_sheet_home: txn_sheet_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn txn_sheet_home(&self) -> &DisplayPath {
        &self.txn_sheet_home
    }
}

/// Args for the `txn-sheet init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The URL of the classification endpoint.
    #[arg(long, default_value = "http://localhost:8000/api/classify/")]
    classify_url: String,
}

impl InitArgs {
    pub fn new(classify_url: impl Into<String>) -> Self {
        Self {
            classify_url: classify_url.into(),
        }
    }

    pub fn classify_url(&self) -> &str {
        &self.classify_url
    }
}

/// Args for the `txn-sheet export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    /// A CSV file with the header row: Date,Description,Amount,Category
    #[arg(long)]
    input: PathBuf,

    /// Earliest allowed transaction date, YYYY-MM-DD.
    #[arg(long)]
    min_date: NaiveDate,

    /// Latest allowed transaction date, YYYY-MM-DD.
    #[arg(long)]
    max_date: NaiveDate,

    /// Where to write the workbook. Defaults to transactions.xlsx in the configured export
    /// directory.
    #[arg(long)]
    out: Option<PathBuf>,
}

impl ExportArgs {
    pub fn new(
        input: impl Into<PathBuf>,
        min_date: NaiveDate,
        max_date: NaiveDate,
        out: Option<PathBuf>,
    ) -> Self {
        Self {
            input: input.into(),
            min_date,
            max_date,
            out,
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn min_date(&self) -> NaiveDate {
        self.min_date
    }

    pub fn max_date(&self) -> NaiveDate {
        self.max_date
    }

    pub fn out(&self) -> Option<&Path> {
        self.out.as_deref()
    }
}

/// Args for the `txn-sheet mcp` command.
#[derive(Debug, Parser, Clone)]
pub struct McpArgs {}

fn default_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("txn-sheet"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --txn-sheet-home or TXN_SHEET_HOME instead of relying on the \
                default home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("txn-sheet")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
