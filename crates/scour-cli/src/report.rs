//! Plain-text rendering of a run for the report file.

use std::fmt::Write;

use scour::RunResult;
use scour::advisory::NO_SUGGESTIONS;

/// Render the ordered issue log and shapes as a text report.
pub fn render_text(result: &RunResult) -> String {
    let mut out = String::new();

    // Infallible: writing into a String
    let _ = writeln!(out, "Data Cleaning Report");
    if let Some(source) = &result.source {
        let _ = writeln!(out, "Source: {} ({})", source.file, source.hash);
    }
    let _ = writeln!(
        out,
        "Shape: {} -> {}",
        shape(result.shape_before),
        shape(result.shape_after)
    );

    if !result.column_types.is_empty() {
        let _ = writeln!(out, "\nColumn types:");
        for (name, column_type) in &result.column_types {
            let _ = writeln!(out, "  {:24} {}", name, column_type.label());
        }
    }

    let _ = writeln!(out, "\nCleaning actions:");
    if result.cleaning_issues.is_empty() {
        let _ = writeln!(out, "- No automatic cleaning actions applied.");
    }
    for issue in &result.cleaning_issues {
        let _ = writeln!(out, "- {}", issue);
    }

    let _ = writeln!(out, "\nValidation issues:");
    if result.validation_issues.is_empty() {
        let _ = writeln!(out, "- No validation issues found.");
    }
    for issue in &result.validation_issues {
        let _ = writeln!(out, "- {}", issue);
    }

    if let Some(advisory) = &result.advisory {
        let _ = writeln!(out, "\nSuggestions ({}):", advisory.provider);
        if advisory.suggestions.is_empty() {
            let _ = writeln!(out, "- {}", NO_SUGGESTIONS);
        }
        for suggestion in &advisory.suggestions {
            let _ = writeln!(out, "- {}", suggestion);
        }
    }

    out
}

pub fn shape((rows, columns): (usize, usize)) -> String {
    format!("{} rows x {} columns", rows, columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scour::advisory::MockAdvisor;
    use scour::{Column, Dataset, Scour};

    fn dataset() -> Dataset {
        Dataset::new(vec![
            Column::new("OrderID", ["A1", "A2", "A3"]),
            Column::new("Status", [" active ", "", "active"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_render_sections_in_order() {
        let result = Scour::new().run_dataset(&dataset());
        let text = render_text(&result);

        assert!(text.starts_with("Data Cleaning Report\n"));
        assert!(text.contains("Shape: 3 rows x 2 columns -> 3 rows x 2 columns"));
        assert!(text.contains("- Status: filled 1 missing values with 'Unknown'."));

        let cleaning = text.find("Cleaning actions:").unwrap();
        let validation = text.find("Validation issues:").unwrap();
        assert!(cleaning < validation);
        assert!(!text.contains("Suggestions"));
    }

    #[test]
    fn test_render_unavailable_advisory() {
        let result = Scour::new()
            .with_advisor(MockAdvisor::failing())
            .run_dataset(&dataset());
        let text = render_text(&result);

        assert!(text.contains("Suggestions (mock):\n- No suggestions available."));
    }
}
