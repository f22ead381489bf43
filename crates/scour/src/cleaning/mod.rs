//! Cleaning: per-type policies, configured rules and the engine that runs them.

mod config;
mod engine;
mod impute;
mod issue;
mod policy;
mod rules;

pub use config::{
    CleaningConfig, ConfigLoad, DateRange, ImputationStrategy, OutlierRule, PolicyConfig,
};
pub use engine::{CleaningEngine, CleaningResult, EngineConfig};
pub use impute::KnnImputer;
pub use issue::{IssueKind, IssueRecord, Stage};
pub use policy::{CleaningPolicy, PolicyOutcome};
