//! Inspect command - show detected column types without cleaning.

use std::path::PathBuf;

use colored::Colorize;
use scour::input::Parser;
use scour::{ColumnType, TypeClassifier};

pub fn run(file: PathBuf, json_output: bool, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (dataset, source) = Parser::new().parse_file(&file)?;
    let classifier = TypeClassifier::new();
    let rows = dataset.row_count();

    if json_output {
        let columns: Vec<_> = dataset
            .columns()
            .iter()
            .map(|column| {
                let column_type = classifier.classify(&column.cells, rows);
                serde_json::json!({
                    "name": column.name,
                    "type": column_type,
                    "missing": column.missing_count(),
                    "distinct": column.distinct_count(),
                })
            })
            .collect();
        let summary = serde_json::json!({
            "source": source,
            "columns": columns,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "{} {} ({} rows x {} columns, {})",
        "Inspecting".cyan().bold(),
        source.file.white(),
        source.row_count,
        source.column_count,
        source.format
    );
    if verbose {
        println!("{} {}", "Hash:".bold(), source.hash);
    }
    println!();

    for column in dataset.columns() {
        let column_type = classifier.classify(&column.cells, rows);
        let label = match column_type {
            ColumnType::Identifier => column_type.label().magenta(),
            ColumnType::Numeric => column_type.label().blue(),
            ColumnType::Date => column_type.label().green(),
            ColumnType::Categorical => column_type.label().yellow(),
            ColumnType::Text | ColumnType::Unknown => column_type.label().normal(),
        };

        let mut line = format!(
            "  {:24} {:12} {} missing, {} distinct",
            column.name,
            label,
            column.missing_count(),
            column.distinct_count()
        );
        if column_type == ColumnType::Date {
            if let Some(format) = classifier.detect_date_format(&column.cells) {
                line.push_str(&format!(", format {}", format.label()));
            }
        }
        println!("{}", line);
    }

    Ok(())
}
