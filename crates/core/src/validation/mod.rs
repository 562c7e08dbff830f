//! Glossary validation of free-text messages.
//!
//! Tokens are pulled out of the text with the [`patterns`] table, checked
//! against a [`GlossaryStore`](crate::glossary::GlossaryStore) and reported as
//! ordered [`Finding`]s.

pub mod diagnostics;
pub mod findings;
pub mod patterns;
pub mod validator;

pub use diagnostics::{DiagnosticSink, TracingSink};
pub use findings::Finding;
pub use patterns::{
    pattern_table, ExtractedToken, ExtractionPattern, PatternTable, TokenCategory,
    WorkItemStrategy,
};
pub use validator::{ValidationReport, Validator};
