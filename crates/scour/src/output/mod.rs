//! Output: cleaned CSV files, reports and versioned file names.

mod writer;

pub use writer::{OutputConfig, save_csv, save_json, save_text, versioned_path, write_csv};
