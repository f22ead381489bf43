//! Dataset representation and column types.

mod cell;
mod column;
mod table;
mod types;

pub use cell::{Cell, format_timestamp};
pub use column::Column;
pub use table::Dataset;
pub use types::ColumnType;

pub(crate) use column::distinct_non_blank;
