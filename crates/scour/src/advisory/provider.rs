//! Advisory provider trait and types.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cleaning::IssueRecord;
use crate::error::Result;
use crate::schema::Dataset;

/// Text shown when no advice could be produced.
pub const NO_SUGGESTIONS: &str = "No suggestions available.";

/// What an advisor gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct AdvisoryRequest<'a> {
    /// The cleaned dataset.
    pub dataset: &'a Dataset,
    pub cleaning_issues: &'a [IssueRecord],
    pub validation_issues: &'a [IssueRecord],
}

impl<'a> AdvisoryRequest<'a> {
    pub fn new(
        dataset: &'a Dataset,
        cleaning_issues: &'a [IssueRecord],
        validation_issues: &'a [IssueRecord],
    ) -> Self {
        Self {
            dataset,
            cleaning_issues,
            validation_issues,
        }
    }

    /// Cleaning issues as one line each.
    pub fn cleaning_summary(&self) -> String {
        summarize(self.cleaning_issues)
    }

    /// Validation issues as one line each, or a note that none were found.
    pub fn validation_summary(&self) -> String {
        if self.validation_issues.is_empty() {
            "No validation issues found.".to_string()
        } else {
            summarize(self.validation_issues)
        }
    }
}

fn summarize(issues: &[IssueRecord]) -> String {
    issues
        .iter()
        .map(|i| i.message.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Trait for advisory providers.
///
/// Advice is purely additive: it never changes the cleaned data or the
/// issue logs. Implementations must be thread-safe (Send + Sync).
pub trait AdvisoryProvider: Send + Sync {
    /// Produce suggestions for further improving the dataset.
    fn suggest(&self, request: &AdvisoryRequest<'_>) -> Result<Vec<String>>;

    /// Get the name of this provider (for logging/reporting).
    fn name(&self) -> &str;
}

/// Advice attached to a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub provider: String,
    pub suggestions: Vec<String>,
    /// False when the provider failed or had nothing to say.
    pub available: bool,
}

impl Advisory {
    /// Ask a provider for advice. Failures are logged and turned into an
    /// unavailable advisory instead of an error.
    pub fn collect(provider: &dyn AdvisoryProvider, request: &AdvisoryRequest<'_>) -> Self {
        match provider.suggest(request) {
            Ok(suggestions) if !suggestions.is_empty() => Self {
                provider: provider.name().to_string(),
                suggestions,
                available: true,
            },
            Ok(_) => Self::unavailable(provider.name()),
            Err(e) => {
                warn!(provider = provider.name(), error = %e, "advisory provider failed");
                Self::unavailable(provider.name())
            }
        }
    }

    pub fn unavailable(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            suggestions: vec![NO_SUGGESTIONS.to_string()],
            available: false,
        }
    }
}
