//! Glossary gate for free-text chat messages.
//!
//! Extracts domain tokens (work items, accounts, line codes, points of sale)
//! from user messages, checks them against an immutable [`GlossaryStore`] and
//! reports ordered findings before a message is forwarded to an agent.

pub mod config;
pub mod errors;
pub mod glossary;
pub mod processor;
pub mod validation;

pub use errors::{ApplicationError, InterfaceError};
pub use glossary::{GlossaryError, GlossaryStore, IncompatibilityRule, WorkItemRange};
pub use processor::{MessageProcessor, ProcessOutcome};
pub use validation::{Finding, ValidationReport, Validator, WorkItemStrategy};
