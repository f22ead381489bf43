//! Type inference: value coercion, statistics and column classification.

mod classifier;
mod coerce;
mod statistics;

pub use classifier::{ClassifierConfig, TypeClassifier};
pub use coerce::{DateFormat, coerce_date, coerce_number, parse_date_generic, parse_number};
pub use statistics::{NumericStatistics, mean, median, most_frequent};
