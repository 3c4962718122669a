// Command-line arguments for the `formdash` binary.

use clap::{Parser, ValueEnum};
use formdash_app::RunOptions;
use std::path::PathBuf;

/// Compare each player's current-season form against their historical baseline
#[derive(Debug, Parser)]
#[command(name = "formdash")]
#[command(version)]
pub struct Cli {
    /// Position to build (GK, DEF, MID or FWD); all four when omitted
    #[arg(short, long)]
    pub position: Option<String>,

    /// Number of baseline players to rank, overriding the configured size
    #[arg(short = 'n', long)]
    pub top_n: Option<usize>,

    /// Write each table to results/{POS}_dashboard.csv
    #[arg(long)]
    pub save_csv: bool,

    /// Skip the HTML workbook
    #[arg(long)]
    pub no_workbook: bool,

    /// Format of the tables printed to stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Directory holding config/, defaults/ and the data paths it names
    #[arg(long, env = "FORMDASH_BASE_DIR", default_value = ".")]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    None,
}

impl Cli {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            positions: self.position.iter().cloned().collect(),
            top_n: self.top_n,
            save_csv: self.save_csv,
        }
    }
}
