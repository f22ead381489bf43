//! Clean command - clean and validate a data file, save the result and a report.

use std::path::PathBuf;

use chrono::Local;
use colored::Colorize;
use scour::advisory::{Advisory, ChatAdvisor, ChatConfig, RuleBasedAdvisor};
use scour::cleaning::{CleaningConfig, ConfigLoad};
use scour::output::{save_csv, save_json, save_text, versioned_path};
use scour::validation::ValidationConfig;
use scour::{IssueRecord, RunResult, Scour, ScourConfig};
use tracing::debug;

use crate::cli::{AdvisorChoice, CleanArgs};
use crate::report;

/// Files written by a clean run.
#[derive(Debug)]
pub struct CleanOutputs {
    pub data: PathBuf,
    pub report: PathBuf,
}

pub fn run(args: CleanArgs, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "{} {}",
        "Cleaning".cyan().bold(),
        args.file.display().to_string().white()
    );

    let result = execute(&args)?;
    print_summary(&result, verbose);

    if args.dry_run {
        println!();
        println!("{}", "Dry run: nothing written.".yellow());
        return Ok(());
    }

    let outputs = save(&args, &result)?;
    println!();
    println!(
        "{} {}",
        "Saved data to".green().bold(),
        outputs.data.display().to_string().white()
    );
    println!(
        "{} {}",
        "Saved report to".green().bold(),
        outputs.report.display().to_string().white()
    );

    Ok(())
}

/// Build the pipeline from the arguments and run it.
pub fn execute(args: &CleanArgs) -> Result<RunResult, Box<dyn std::error::Error>> {
    // Load cleaning rules; problems in the file are warnings, never fatal
    let rules = match &args.config {
        Some(path) => {
            let ConfigLoad { config, warnings } = CleaningConfig::load_lenient(path);
            for warning in &warnings {
                eprintln!("{} {}", "warning:".yellow().bold(), warning);
            }
            config
        }
        None => CleaningConfig::default(),
    };

    let mut config = ScourConfig::default();
    config.engine.rules = rules;
    config.validation = validation_config(args);

    let mut scour = Scour::with_config(config);
    let mut fallback = None;
    debug!(advisor = %args.advisor, "advisor selected");
    match args.advisor {
        AdvisorChoice::None => {}
        AdvisorChoice::Rules => scour = scour.with_advisor(RuleBasedAdvisor::new()),
        AdvisorChoice::Chat => match ChatAdvisor::from_env(ChatConfig::default()) {
            Ok(advisor) => scour = scour.with_advisor(advisor),
            Err(e) => {
                eprintln!("{} {}", "warning:".yellow().bold(), e);
                fallback = Some(Advisory::unavailable("chat"));
            }
        },
    }

    let mut result = scour.run(&args.file)?;
    if result.advisory.is_none() {
        result.advisory = fallback;
    }
    Ok(result)
}

/// Write the cleaned data and the report under versioned names.
pub fn save(args: &CleanArgs, result: &RunResult) -> Result<CleanOutputs, Box<dyn std::error::Error>> {
    let now = Local::now().naive_local();

    let data = versioned_path(&args.output_dir, &args.file, "csv", now);
    save_csv(&result.dataset, &data)?;

    let report = if args.json {
        let path = versioned_path(&args.report_dir, &args.file, "json", now);
        save_json(result, &path)?;
        path
    } else {
        let path = versioned_path(&args.report_dir, &args.file, "txt", now);
        save_text(&report::render_text(result), &path)?;
        path
    };

    Ok(CleanOutputs { data, report })
}

fn validation_config(args: &CleanArgs) -> ValidationConfig {
    let mut config = ValidationConfig::default();
    if !args.numeric_columns.is_empty() {
        config.numeric_columns = args.numeric_columns.clone();
    }
    if let Some(column) = &args.date_column {
        config.date_column = column.clone();
    }
    config
}

fn print_summary(result: &RunResult, verbose: bool) {
    if verbose {
        println!();
        println!("{}", "Column types:".yellow().bold());
        for (name, column_type) in &result.column_types {
            println!("  {:24} {}", name, column_type.label());
        }
    }

    println!();
    println!(
        "{} {} -> {}",
        "Shape:".bold(),
        report::shape(result.shape_before),
        report::shape(result.shape_after)
    );

    println!();
    println!("{}", "Cleaning summary:".cyan().bold());
    print_issues(&result.cleaning_issues, "No automatic cleaning actions applied.");

    println!();
    println!("{}", "Validation summary:".cyan().bold());
    if result.is_clean() {
        println!(" - {}", "No validation issues found.".green());
    } else {
        for issue in &result.validation_issues {
            println!(" - {}", issue.message.red());
        }
    }

    if let Some(advisory) = &result.advisory {
        println!();
        println!("{} ({})", "Suggestions".cyan().bold(), advisory.provider);
        for suggestion in &advisory.suggestions {
            println!(" - {}", suggestion);
        }
    }
}

fn print_issues(issues: &[IssueRecord], empty: &str) {
    if issues.is_empty() {
        println!(" - {}", empty);
    }
    for issue in issues {
        println!(" - {}", issue);
    }
}
