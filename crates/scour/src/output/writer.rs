//! Writing cleaned datasets to disk.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScourError};
use crate::schema::Dataset;

/// Where cleaned data and reports go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub processed_dir: PathBuf,
    pub report_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            processed_dir: PathBuf::from("data/processed"),
            report_dir: PathBuf::from("reports"),
        }
    }
}

/// Derive a timestamped file name: `<stem>_<YYYYmmdd_HHMMSS>.<ext>` inside `dir`.
///
/// # Example
///
/// ```
/// # use scour::output::versioned_path;
/// # use chrono::NaiveDate;
/// let at = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(9, 5, 0).unwrap();
/// let path = versioned_path("data/processed", "sales.csv", "csv", at);
/// assert_eq!(path.to_str(), Some("data/processed/sales_20240301_090500.csv"));
/// ```
pub fn versioned_path(
    dir: impl AsRef<Path>,
    source: impl AsRef<Path>,
    extension: &str,
    at: NaiveDateTime,
) -> PathBuf {
    let stem = source
        .as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "dataset".to_string());
    dir.as_ref()
        .join(format!("{}_{}.{}", stem, at.format("%Y%m%d_%H%M%S"), extension))
}

/// Write a dataset as CSV. Missing cells become empty fields.
pub fn write_csv<W: Write>(dataset: &Dataset, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(dataset.column_names())?;

    for row in 0..dataset.row_count() {
        let record: Vec<String> = dataset
            .columns()
            .iter()
            .map(|c| c.cells[row].to_string())
            .collect();
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush().map_err(|e| ScourError::Io {
        path: PathBuf::from("<csv output>"),
        source: e,
    })?;
    Ok(())
}

/// Save a dataset as a CSV file, creating parent directories as needed.
pub fn save_csv(dataset: &Dataset, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    create_parent(path)?;
    let file = File::create(path).map_err(|e| ScourError::from_io(path, e))?;
    write_csv(dataset, BufWriter::new(file))
}

/// Save any serializable value as pretty JSON.
pub fn save_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    create_parent(path)?;
    let file = File::create(path).map_err(|e| ScourError::from_io(path, e))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    Ok(())
}

/// Save text, creating parent directories as needed.
pub fn save_text(text: &str, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    create_parent(path)?;
    fs::write(path, text).map_err(|e| ScourError::from_io(path, e))
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| ScourError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Cell, Column};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample() -> Dataset {
        let joined = NaiveDate::from_ymd_opt(2023, 1, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Dataset::new(vec![
            Column::new("Name", ["Ann", "Bo, Jr"]),
            Column::new("Price", [Some(10.0), None]),
            Column::new("Joined", vec![Cell::Timestamp(joined), Cell::Missing]),
        ])
        .unwrap()
    }

    #[test]
    fn test_write_csv() {
        let mut buffer = Vec::new();
        write_csv(&sample(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "Name,Price,Joined\nAnn,10,2023-01-05\n\"Bo, Jr\",,\n");
    }

    #[test]
    fn test_save_creates_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/out/clean.csv");
        save_csv(&sample(), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_versioned_path_without_stem() {
        let at = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        let path = versioned_path("out", "", "txt", at);
        assert_eq!(path, PathBuf::from("out/dataset_20240102_030405.txt"));
    }
}
