//! Optional advice on further improving a cleaned dataset.
//!
//! Providers are consulted after cleaning and validation and can never
//! change their results. A failing provider yields an unavailable
//! [`Advisory`] instead of an error.

mod chat;
mod mock;
mod provider;
mod rules;

pub use chat::{ChatAdvisor, ChatConfig, build_prompt, parse_suggestions};
pub use mock::MockAdvisor;
pub use provider::{Advisory, AdvisoryProvider, AdvisoryRequest, NO_SUGGESTIONS};
pub use rules::{RuleBasedAdvisor, RuleConfig};
