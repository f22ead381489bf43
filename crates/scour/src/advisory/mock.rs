//! Mock advisory provider for testing.

use crate::error::{Result, ScourError};

use super::provider::{AdvisoryProvider, AdvisoryRequest};

/// Returns canned suggestions, or fails on demand.
#[derive(Debug, Clone, Default)]
pub struct MockAdvisor {
    suggestions: Vec<String>,
    fail: bool,
}

impl MockAdvisor {
    /// Create a mock that answers with the given suggestions.
    pub fn new(suggestions: Vec<String>) -> Self {
        Self {
            suggestions,
            fail: false,
        }
    }

    /// Create a mock whose every call fails, like an unreachable service.
    pub fn failing() -> Self {
        Self {
            suggestions: Vec::new(),
            fail: true,
        }
    }
}

impl AdvisoryProvider for MockAdvisor {
    fn suggest(&self, _request: &AdvisoryRequest<'_>) -> Result<Vec<String>> {
        if self.fail {
            return Err(ScourError::Advisory("mock service unavailable".to_string()));
        }
        Ok(self.suggestions.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
