//! Input handling for tabular data files.

mod parser;
mod source;

pub use parser::{Parser, ParserConfig};
pub use source::SourceMetadata;
