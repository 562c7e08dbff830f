//! Declarative extraction table: one compiled pattern per token category.
//!
//! Patterns are compiled on first use and shared for the rest of the process.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenCategory {
    WorkItem,
    Account,
    Line,
    Pdv,
}

impl TokenCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WorkItem => "work_item",
            Self::Account => "account",
            Self::Line => "line",
            Self::Pdv => "pdv",
        }
    }
}

/// How work-item identifiers are located in free text. Exactly one strategy
/// is active per validator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemStrategy {
    /// Any standalone run of 5 to 8 digits.
    #[default]
    BareDigits,
    /// Only digits following an explicit `WIP` marker.
    Keyword,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExtractedToken {
    pub category: TokenCategory,
    pub raw: String,
    pub normalized: String,
    pub span: Range<usize>,
}

pub struct ExtractionPattern {
    pub name: &'static str,
    pub category: TokenCategory,
    regex: Regex,
    group: usize,
    normalize: fn(&str) -> String,
}

impl ExtractionPattern {
    fn new(
        name: &'static str,
        category: TokenCategory,
        pattern: &str,
        group: usize,
        normalize: fn(&str) -> String,
    ) -> Self {
        let regex = Regex::new(pattern).expect("extraction pattern should compile");
        Self { name, category, regex, group, normalize }
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Tokens in order of appearance.
    pub fn extract(&self, text: &str) -> Vec<ExtractedToken> {
        self.regex
            .captures_iter(text)
            .filter_map(|captures| captures.get(self.group))
            .map(|matched| ExtractedToken {
                category: self.category,
                raw: matched.as_str().to_string(),
                normalized: (self.normalize)(matched.as_str()),
                span: matched.range(),
            })
            .collect()
    }
}

impl std::fmt::Debug for ExtractionPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionPattern")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("pattern", &self.regex.as_str())
            .field("group", &self.group)
            .finish()
    }
}

#[derive(Debug)]
pub struct PatternTable {
    work_item_bare_digits: ExtractionPattern,
    work_item_keyword: ExtractionPattern,
    account: ExtractionPattern,
    line: ExtractionPattern,
    pdv: ExtractionPattern,
}

static PATTERNS: LazyLock<PatternTable> = LazyLock::new(PatternTable::compile);

pub fn pattern_table() -> &'static PatternTable {
    &PATTERNS
}

impl PatternTable {
    fn compile() -> Self {
        // Work-item digits are ASCII only, in both strategies.
        Self {
            work_item_bare_digits: ExtractionPattern::new(
                "work_item.bare_digits",
                TokenCategory::WorkItem,
                r"\b[0-9]{5,8}\b",
                0,
                keep,
            ),
            work_item_keyword: ExtractionPattern::new(
                "work_item.keyword",
                TokenCategory::WorkItem,
                r"(?i)\bWIP\s+([0-9]+)\b",
                1,
                keep,
            ),
            account: ExtractionPattern::new(
                "account",
                TokenCategory::Account,
                r"\b[IE][0-9]{6}\b",
                0,
                keep,
            ),
            line: ExtractionPattern::new(
                "line",
                TokenCategory::Line,
                r"\b(?i:ZZ)[A-Za-z0-9]+\b",
                0,
                uppercase,
            ),
            pdv: ExtractionPattern::new(
                "pdv",
                TokenCategory::Pdv,
                r"(?i)\b(?:pdv|punto\s+de\s+venta)\s+([A-Za-z0-9]+)\b",
                1,
                keep,
            ),
        }
    }

    pub fn work_item(&self, strategy: WorkItemStrategy) -> &ExtractionPattern {
        match strategy {
            WorkItemStrategy::BareDigits => &self.work_item_bare_digits,
            WorkItemStrategy::Keyword => &self.work_item_keyword,
        }
    }

    pub fn account(&self) -> &ExtractionPattern {
        &self.account
    }

    pub fn line(&self) -> &ExtractionPattern {
        &self.line
    }

    pub fn pdv(&self) -> &ExtractionPattern {
        &self.pdv
    }

    pub fn for_category(
        &self,
        category: TokenCategory,
        strategy: WorkItemStrategy,
    ) -> &ExtractionPattern {
        match category {
            TokenCategory::WorkItem => self.work_item(strategy),
            TokenCategory::Account => &self.account,
            TokenCategory::Line => &self.line,
            TokenCategory::Pdv => &self.pdv,
        }
    }
}

fn keep(raw: &str) -> String {
    raw.to_string()
}

fn uppercase(raw: &str) -> String {
    raw.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::{pattern_table, TokenCategory, WorkItemStrategy};

    fn raw(category: TokenCategory, text: &str) -> Vec<String> {
        pattern_table()
            .for_category(category, WorkItemStrategy::BareDigits)
            .extract(text)
            .into_iter()
            .map(|token| token.raw)
            .collect()
    }

    #[test]
    fn bare_digit_runs_respect_length_and_word_boundaries() {
        assert_eq!(raw(TokenCategory::WorkItem, "WIP 12589"), vec!["12589"]);
        assert_eq!(raw(TokenCategory::WorkItem, "ids 1234 and 12345678"), vec!["12345678"]);
        assert!(raw(TokenCategory::WorkItem, "123456789").is_empty());
        assert!(raw(TokenCategory::WorkItem, "ref12345 12345x").is_empty());
        assert!(raw(TokenCategory::WorkItem, "E123456").is_empty());
    }

    #[test]
    fn work_item_digits_are_ascii_only() {
        assert!(raw(TokenCategory::WorkItem, "\u{669}\u{669}\u{669}\u{669}\u{669}").is_empty());
        assert!(pattern_table()
            .work_item(WorkItemStrategy::Keyword)
            .extract("WIP \u{0663}\u{0663}\u{0663}")
            .is_empty());
    }

    #[test]
    fn leading_zeros_normalize_to_digits_as_written() {
        let tokens = pattern_table().work_item(WorkItemStrategy::BareDigits).extract("010001");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].normalized, "010001");
        assert_eq!(tokens[0].span, 0..6);
    }

    #[test]
    fn keyword_strategy_only_fires_on_explicit_marker() {
        let pattern = pattern_table().work_item(WorkItemStrategy::Keyword);
        let tokens = pattern.extract("wip 123 and 55555 and WIP   99999");
        let values = tokens.iter().map(|token| token.raw.as_str()).collect::<Vec<_>>();
        assert_eq!(values, vec!["123", "99999"]);
    }

    #[test]
    fn accounts_are_case_sensitive_whole_words() {
        assert_eq!(raw(TokenCategory::Account, "E123456, I741351"), vec!["E123456", "I741351"]);
        assert!(raw(TokenCategory::Account, "e123456 X123456 I1234567 AI123456").is_empty());
    }

    #[test]
    fn lines_match_any_casing_and_normalize_to_uppercase() {
        let tokens = pattern_table().line().extract("zzVenta and ZZCOMPRA, not xZZA or ZZ");
        let pairs = tokens
            .iter()
            .map(|token| (token.raw.as_str(), token.normalized.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(pairs, vec![("zzVenta", "ZZVENTA"), ("ZZCOMPRA", "ZZCOMPRA")]);
    }

    #[test]
    fn pdv_recognizes_both_anchor_phrasings() {
        assert_eq!(
            raw(TokenCategory::Pdv, "en PdV Pa, pdv W1 y Punto de Venta Pb"),
            vec!["Pa", "W1", "Pb"]
        );
        assert!(raw(TokenCategory::Pdv, "PdV").is_empty());
        assert!(raw(TokenCategory::Pdv, "xPdV Pa").is_empty());
    }

    #[test]
    fn patterns_are_named_per_category() {
        let table = pattern_table();
        assert_eq!(table.account().category, TokenCategory::Account);
        assert_eq!(table.pdv().name, "pdv");
        assert!(table.line().pattern().contains("ZZ"));
    }
}
