use std::sync::Arc;

use serde::Serialize;

use super::diagnostics::DiagnosticSink;
use super::findings::Finding;
use super::patterns::{pattern_table, ExtractedToken, TokenCategory, WorkItemStrategy};
use crate::glossary::GlossaryStore;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub findings: Vec<Finding>,
    pub tokens: Vec<ExtractedToken>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        self.findings.iter().map(ToString::to_string).collect()
    }

    pub fn tokens_of(&self, category: TokenCategory) -> impl Iterator<Item = &ExtractedToken> {
        self.tokens.iter().filter(move |token| token.category == category)
    }
}

/// Checks free text against a glossary. Categories are always scanned in the
/// same order (work items, accounts, lines, points of sale, incompatibilities)
/// and every category is scanned even after earlier findings.
#[derive(Clone)]
pub struct Validator {
    glossary: Arc<GlossaryStore>,
    strategy: WorkItemStrategy,
    sink: Option<Arc<dyn DiagnosticSink>>,
}

impl Validator {
    pub fn new(glossary: Arc<GlossaryStore>) -> Self {
        Self { glossary, strategy: WorkItemStrategy::default(), sink: None }
    }

    pub fn with_strategy(mut self, strategy: WorkItemStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn glossary(&self) -> &GlossaryStore {
        &self.glossary
    }

    pub fn strategy(&self) -> WorkItemStrategy {
        self.strategy
    }

    pub fn validate(&self, text: &str) -> Vec<String> {
        self.inspect(text).messages()
    }

    pub fn inspect(&self, text: &str) -> ValidationReport {
        let patterns = pattern_table();
        let glossary = &self.glossary;
        let mut report = ValidationReport::default();

        let range = glossary.work_item_range();
        for token in patterns.work_item(self.strategy).extract(text) {
            self.observe(&token);
            match token.normalized.parse::<u64>() {
                Ok(value) if !glossary.is_work_item_in_range(value) => {
                    self.record(&mut report, Finding::OutOfRangeWorkItem { value, range });
                }
                Ok(_) => {}
                Err(_) => {
                    self.record(
                        &mut report,
                        Finding::MalformedWorkItem { raw: token.raw.clone() },
                    );
                }
            }
            report.tokens.push(token);
        }

        let mut accounts = Vec::new();
        for token in patterns.account().extract(text) {
            self.observe(&token);
            if !glossary.is_valid_account(&token.normalized) {
                self.record(&mut report, Finding::UnknownAccount { code: token.raw.clone() });
            }
            accounts.push(token.normalized.clone());
            report.tokens.push(token);
        }

        let mut lines = Vec::new();
        for token in patterns.line().extract(text) {
            self.observe(&token);
            if !glossary.is_valid_line(&token.normalized) {
                self.record(&mut report, Finding::UnknownLine { raw: token.raw.clone() });
            }
            lines.push(token.normalized.clone());
            report.tokens.push(token);
        }

        for token in patterns.pdv().extract(text) {
            self.observe(&token);
            if !glossary.is_valid_pdv(&token.normalized) {
                self.record(&mut report, Finding::UnknownPdv { code: token.raw.clone() });
            }
            report.tokens.push(token);
        }

        // Runs regardless of whether the line or account was itself valid.
        for rule in glossary.incompatibility_rules() {
            if !lines.iter().any(|line| *line == rule.line) {
                continue;
            }
            for account in accounts.iter().filter(|account| rule.forbids(account)) {
                self.record(
                    &mut report,
                    Finding::IncompatibleCombination {
                        line: rule.line.clone(),
                        account: account.clone(),
                    },
                );
            }
        }

        report
    }

    fn observe(&self, token: &ExtractedToken) {
        if let Some(sink) = &self.sink {
            sink.token_extracted(token);
        }
    }

    fn record(&self, report: &mut ValidationReport, finding: Finding) {
        if let Some(sink) = &self.sink {
            sink.finding_recorded(&finding);
        }
        report.findings.push(finding);
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("glossary_version", &self.glossary.version())
            .field("strategy", &self.strategy)
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}
