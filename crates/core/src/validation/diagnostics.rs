use tracing::debug;

use super::findings::Finding;
use super::patterns::ExtractedToken;

/// Optional observer for validation internals. Implementations must not
/// influence outcomes; a validator without a sink behaves identically.
pub trait DiagnosticSink: Send + Sync {
    fn token_extracted(&self, _token: &ExtractedToken) {}

    fn finding_recorded(&self, _finding: &Finding) {}
}

/// Forwards diagnostics to `tracing` at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn token_extracted(&self, token: &ExtractedToken) {
        debug!(
            event_name = "validation.token.extracted",
            category = token.category.as_str(),
            raw = %token.raw,
            normalized = %token.normalized,
            start = token.span.start,
            end = token.span.end,
            "token extracted"
        );
    }

    fn finding_recorded(&self, finding: &Finding) {
        debug!(
            event_name = "validation.finding.recorded",
            kind = finding.kind(),
            message = %finding,
            "validation finding recorded"
        );
    }
}
