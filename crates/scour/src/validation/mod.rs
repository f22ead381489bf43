//! Validation of cleaned data.

mod checks;
mod validator;

pub use checks::{Check, DateColumnCheck, DuplicateRowCheck, MissingValueCheck, NumericColumnCheck};
pub use validator::{ValidationConfig, Validator};
