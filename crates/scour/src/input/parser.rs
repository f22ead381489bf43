//! CSV/TSV loader with delimiter detection.

use std::collections::HashSet;
use std::io::{BufRead, BufReader};
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{Result, ScourError};
use crate::schema::Dataset;

use super::source::SourceMetadata;

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
        }
    }
}

/// Loads delimited text files into a [`Dataset`].
#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Load a file and return the dataset and its metadata.
    ///
    /// A missing file is [`ScourError::SourceNotFound`]. An empty file gives
    /// an empty dataset rather than an error.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(Dataset, SourceMetadata)> {
        let path = path.as_ref();
        let contents = std::fs::read(path).map_err(|e| ScourError::from_io(path, e))?;

        let hash = format!("sha256:{:x}", Sha256::digest(&contents));

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(&contents),
        };
        debug!(delimiter = %(delimiter as char).escape_default(), "using delimiter");

        let dataset = self.parse_bytes(&contents, delimiter)?;

        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        }
        .to_string();

        info!(
            path = %path.display(),
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "loaded dataset"
        );

        let metadata = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            contents.len() as u64,
            format,
            dataset.shape(),
        );
        Ok((dataset, metadata))
    }

    /// Parse delimited bytes.
    pub fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let mut records = reader.records();

        let headers: Vec<String> = if self.config.has_header {
            match records.next() {
                Some(record) => record?
                    .iter()
                    .map(|s| s.trim_start_matches('\u{feff}').to_string())
                    .collect(),
                None => return Ok(Dataset::empty()),
            }
        } else {
            Vec::new()
        };

        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in records {
            if self.config.max_rows.is_some_and(|max| rows.len() >= max) {
                break;
            }
            let record = record?;
            rows.push(record.iter().map(|s| s.to_string()).collect());
        }

        let headers = if self.config.has_header {
            headers
        } else {
            let width = rows.iter().map(Vec::len).max().unwrap_or(0);
            (1..=width).map(|i| format!("column_{}", i)).collect()
        };

        if headers.is_empty() {
            return Ok(Dataset::empty());
        }

        Dataset::from_records(unique_headers(headers), rows)
    }
}

/// Suffix repeated header names so every column name is unique.
fn unique_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(headers.len());
    headers
        .into_iter()
        .map(|name| {
            let mut candidate = name.clone();
            let mut suffix = 2;
            while !seen.insert(candidate.clone()) {
                candidate = format!("{}_{}", name, suffix);
                suffix += 1;
            }
            candidate
        })
        .collect()
}

/// Detect the delimiter by analyzing the first few lines. Falls back to comma.
fn detect_delimiter(bytes: &[u8]) -> u8 {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .map_while(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let Some(&first_count) = counts.first() else {
            continue;
        };
        if first_count == 0 {
            continue;
        }

        let consistent = counts.iter().all(|&c| c == first_count);
        let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
        let variance = counts
            .iter()
            .map(|&c| (c as f64 - mean).powi(2))
            .sum::<f64>()
            / counts.len() as f64;

        // Consistent counts win; tab gets a small bonus since it rarely
        // appears inside values
        let score = if consistent {
            first_count * 1000 + if delim == b'\t' { 100 } else { 0 }
        } else if variance < 1.0 {
            first_count * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    best_delimiter
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Cell;

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter(b"a,b,c\n1,2,3\n4,5,6"), b',');
        assert_eq!(detect_delimiter(b"a\tb\tc\n1\t2\t3"), b'\t');
        assert_eq!(detect_delimiter(b"a;b\n1;2"), b';');
        assert_eq!(detect_delimiter(b""), b',');
    }

    #[test]
    fn test_quoted_delimiters_ignored() {
        assert_eq!(detect_delimiter(b"name;note\n\"Smith, J\";ok\n\"Doe, A\";ok"), b';');
    }

    #[test]
    fn test_parse_typed_columns() {
        let ds = Parser::new()
            .parse_bytes(b"Item,Quantity,Price\nCoffee,2,3.5\nTea,,NA\nCake,1,ERROR", b',')
            .unwrap();

        assert_eq!(ds.shape(), (3, 3));
        assert_eq!(ds.get(1, 1), Some(&Cell::Missing));
        assert_eq!(ds.get(0, 1), Some(&Cell::Number(2.0)));
        assert_eq!(ds.get(2, 2), Some(&Cell::text("ERROR")));
    }

    #[test]
    fn test_header_only_file() {
        let ds = Parser::new().parse_bytes(b"a,b\n", b',').unwrap();
        assert_eq!(ds.column_names(), vec!["a", "b"]);
        assert_eq!(ds.row_count(), 0);
    }

    #[test]
    fn test_empty_input() {
        let ds = Parser::new().parse_bytes(b"", b',').unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.column_count(), 0);
    }

    #[test]
    fn test_repeated_headers_are_suffixed() {
        let ds = Parser::new().parse_bytes(b"x,x,y\n1,2,3", b',').unwrap();
        assert_eq!(ds.column_names(), vec!["x", "x_2", "y"]);
    }

    #[test]
    fn test_without_header() {
        let parser = Parser::with_config(ParserConfig {
            has_header: false,
            ..ParserConfig::default()
        });
        let ds = parser.parse_bytes(b"1,a\n2,b", b',').unwrap();
        assert_eq!(ds.column_names(), vec!["column_1", "column_2"]);
        assert_eq!(ds.row_count(), 2);
    }

    #[test]
    fn test_max_rows() {
        let parser = Parser::with_config(ParserConfig {
            max_rows: Some(1),
            ..ParserConfig::default()
        });
        let ds = parser.parse_bytes(b"a\n1\n2\n3", b',').unwrap();
        assert_eq!(ds.row_count(), 1);
    }
}
