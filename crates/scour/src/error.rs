//! Error types for the Scour library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Scour operations.
///
/// Only source problems are fatal to a pipeline run. Value coercion failures,
/// empty input and advisory outages are recovered inside the pipeline and
/// show up as issue records or log warnings instead.
#[derive(Debug, Error)]
pub enum ScourError {
    /// The raw dataset does not exist.
    #[error("Source not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    /// Error reading or writing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A dataset violates its shape invariants (ragged or duplicate columns).
    #[error("Invalid dataset shape: {0}")]
    Shape(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The advisory service failed or returned an unusable answer.
    #[error("Advisory error: {0}")]
    Advisory(String),
}

impl ScourError {
    /// Wrap an IO error, mapping "not found" to [`ScourError::SourceNotFound`].
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            ScourError::SourceNotFound { path }
        } else {
            ScourError::Io { path, source }
        }
    }

    /// Returns true if the error means the source could not be located.
    pub fn is_source_unavailable(&self) -> bool {
        matches!(self, ScourError::SourceNotFound { .. })
    }
}

/// Result type alias for Scour operations.
pub type Result<T> = std::result::Result<T, ScourError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_source_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = ScourError::from_io("data/raw.csv", io);
        assert!(err.is_source_unavailable());
        assert_eq!(err.to_string(), "Source not found: data/raw.csv");
    }

    #[test]
    fn test_other_io_errors_stay_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err = ScourError::from_io("data/raw.csv", io);
        assert!(!err.is_source_unavailable());
        assert!(matches!(err, ScourError::Io { .. }));
    }
}
