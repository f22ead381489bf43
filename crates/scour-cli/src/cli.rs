//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Scour: type-aware cleaning for messy tabular data
#[derive(Parser)]
#[command(name = "scour")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean and validate a data file, then save the data and a report
    Clean(CleanArgs),

    /// Show the detected type of every column without changing anything
    Inspect {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
pub struct CleanArgs {
    /// Path to the data file (CSV/TSV)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// JSON file with cleaning rules (drop_columns, replace_values, clamp, ...)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for the cleaned data
    #[arg(short, long, default_value = "data/processed")]
    pub output_dir: PathBuf,

    /// Directory for the report
    #[arg(short, long, default_value = "reports")]
    pub report_dir: PathBuf,

    /// Write the report as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Advisory provider for follow-up suggestions
    #[arg(long, default_value = "none")]
    pub advisor: AdvisorChoice,

    /// Column the validator must find numeric (repeatable, replaces the defaults)
    #[arg(long = "numeric-column", value_name = "NAME")]
    pub numeric_columns: Vec<String>,

    /// Column the validator checks for valid dates
    #[arg(long, value_name = "NAME")]
    pub date_column: Option<String>,

    /// Print the summary without writing any files
    #[arg(long)]
    pub dry_run: bool,
}

/// Advisory provider choice
#[derive(Clone, Debug, Default, PartialEq)]
pub enum AdvisorChoice {
    /// No advice
    #[default]
    None,
    /// Built-in heuristics (missing values, outliers, spacing)
    Rules,
    /// Chat-completions service (requires GROQ_API_KEY)
    Chat,
}

impl std::str::FromStr for AdvisorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(AdvisorChoice::None),
            "rules" => Ok(AdvisorChoice::Rules),
            "chat" | "groq" => Ok(AdvisorChoice::Chat),
            _ => Err(format!("Unknown advisor: {}. Use none, rules, or chat.", s)),
        }
    }
}

impl std::fmt::Display for AdvisorChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdvisorChoice::None => write!(f, "none"),
            AdvisorChoice::Rules => write!(f, "rules"),
            AdvisorChoice::Chat => write!(f, "chat"),
        }
    }
}
