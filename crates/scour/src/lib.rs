//! Scour: type-aware cleaning for messy tabular data.
//!
//! Scour loads a raw CSV extract, works out what each column holds, repairs
//! it with a rule suited to that kind of data and then checks the result.
//!
//! # Core Principles
//!
//! - **Type first**: every column gets exactly one type from a fixed
//!   precedence chain (identifier, numeric, date, text, categorical)
//! - **Non-destructive**: the input dataset is never modified
//! - **Auditable**: every repair is recorded as an issue, in order
//!
//! # Example
//!
//! ```no_run
//! use scour::Scour;
//!
//! let scour = Scour::new();
//! let result = scour.run("data/raw/sales.csv").unwrap();
//!
//! for issue in &result.cleaning_issues {
//!     println!("{}", issue);
//! }
//! println!("Remaining problems: {}", result.validation_issues.len());
//! ```

pub mod advisory;
pub mod cleaning;
pub mod error;
pub mod inference;
pub mod input;
pub mod output;
pub mod schema;
pub mod validation;

mod scour;

pub use crate::scour::{RunResult, Scour, ScourConfig};
pub use cleaning::{CleaningConfig, CleaningEngine, CleaningPolicy, CleaningResult, IssueRecord};
pub use error::{Result, ScourError};
pub use inference::TypeClassifier;
pub use input::SourceMetadata;
pub use schema::{Cell, Column, ColumnType, Dataset};
pub use validation::Validator;
