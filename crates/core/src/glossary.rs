//! Reference data the validator checks extracted tokens against.
//!
//! A [`GlossaryStore`] is built once at startup (compiled-in defaults or a
//! versioned TOML document) and is read-only afterwards, so it can be shared
//! behind an `Arc` across concurrent validation calls without locking.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const BUILTIN_VERSION: &str = "builtin";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemRange {
    pub min: u64,
    pub max: u64,
}

impl WorkItemRange {
    pub fn contains(&self, value: u64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Forbids `line` from appearing together with accounts starting with
/// `forbidden_account_prefix`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncompatibilityRule {
    pub line: String,
    pub forbidden_account_prefix: String,
}

impl IncompatibilityRule {
    pub fn forbids(&self, account: &str) -> bool {
        account.starts_with(&self.forbidden_account_prefix)
    }
}

#[derive(Debug, Error)]
pub enum GlossaryError {
    #[error("could not read glossary file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse glossary document: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("work item range is inverted: min {min} is greater than max {max}")]
    InvertedRange { min: u64, max: u64 },
    #[error("duplicate {set} entry `{value}`")]
    DuplicateEntry { set: &'static str, value: String },
    #[error("incompatibility rule #{index} is missing its {field}")]
    IncompleteRule { index: usize, field: &'static str },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlossaryStore {
    version: String,
    work_items: WorkItemRange,
    lines: BTreeSet<String>,
    accounts: BTreeSet<String>,
    pdv_codes: BTreeSet<String>,
    rules: Vec<IncompatibilityRule>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GlossarySummary {
    pub version: String,
    pub work_items: WorkItemRange,
    pub line_count: usize,
    pub account_count: usize,
    pub pdv_count: usize,
    pub rules: Vec<IncompatibilityRule>,
}

impl GlossaryStore {
    pub fn builtin() -> Self {
        Self {
            version: BUILTIN_VERSION.to_string(),
            work_items: WorkItemRange { min: 10_001, max: 65_535 },
            lines: ["ZZCAMPREC", "ZZVENTA", "ZZCOMPRA"].into_iter().map(String::from).collect(),
            accounts: ["I741351", "E123456"].into_iter().map(String::from).collect(),
            pdv_codes: ["Pa", "Pb", "W1"].into_iter().map(String::from).collect(),
            rules: vec![IncompatibilityRule {
                line: "ZZCAMPREC".to_string(),
                forbidden_account_prefix: "I".to_string(),
            }],
        }
    }

    pub fn load(path: &Path) -> Result<Self, GlossaryError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| GlossaryError::ReadFile { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, GlossaryError> {
        let document = toml::from_str::<GlossaryDocument>(raw)?;
        Self::from_document(document)
    }

    pub fn from_document(document: GlossaryDocument) -> Result<Self, GlossaryError> {
        let GlossaryDocument { version, work_items, lines, accounts, pdv_codes, incompatibilities } =
            document;

        if work_items.min > work_items.max {
            return Err(GlossaryError::InvertedRange { min: work_items.min, max: work_items.max });
        }

        let lines =
            unique_set("line", lines.into_iter().map(|line| line.trim().to_ascii_uppercase()))?;
        let accounts = unique_set("account", accounts)?;
        let pdv_codes = unique_set("point of sale", pdv_codes)?;

        let mut rules = Vec::with_capacity(incompatibilities.len());
        for (index, rule) in incompatibilities.into_iter().enumerate() {
            let line = rule.line.trim().to_ascii_uppercase();
            if line.is_empty() {
                return Err(GlossaryError::IncompleteRule { index, field: "line" });
            }
            if rule.forbidden_account_prefix.is_empty() {
                return Err(GlossaryError::IncompleteRule {
                    index,
                    field: "forbidden_account_prefix",
                });
            }
            rules.push(IncompatibilityRule {
                line,
                forbidden_account_prefix: rule.forbidden_account_prefix,
            });
        }

        Ok(Self { version, work_items, lines, accounts, pdv_codes, rules })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn work_item_range(&self) -> WorkItemRange {
        self.work_items
    }

    pub fn is_work_item_in_range(&self, value: u64) -> bool {
        self.work_items.contains(value)
    }

    /// Exact, case-sensitive match.
    pub fn is_valid_account(&self, code: &str) -> bool {
        self.accounts.contains(code)
    }

    /// Callers pass the upper-cased line code.
    pub fn is_valid_line(&self, code: &str) -> bool {
        self.lines.contains(code)
    }

    /// Exact, case-sensitive match.
    pub fn is_valid_pdv(&self, code: &str) -> bool {
        self.pdv_codes.contains(code)
    }

    pub fn incompatibility_rules(&self) -> &[IncompatibilityRule] {
        &self.rules
    }

    pub fn summary(&self) -> GlossarySummary {
        GlossarySummary {
            version: self.version.clone(),
            work_items: self.work_items,
            line_count: self.lines.len(),
            account_count: self.accounts.len(),
            pdv_count: self.pdv_codes.len(),
            rules: self.rules.clone(),
        }
    }
}

impl Default for GlossaryStore {
    fn default() -> Self {
        Self::builtin()
    }
}

fn unique_set(
    set: &'static str,
    values: impl IntoIterator<Item = String>,
) -> Result<BTreeSet<String>, GlossaryError> {
    let mut unique = BTreeSet::new();
    for value in values {
        if !unique.insert(value.clone()) {
            return Err(GlossaryError::DuplicateEntry { set, value });
        }
    }
    Ok(unique)
}

/// On-disk shape of a glossary. Sets are plain arrays so that duplicates can
/// be reported instead of silently collapsed.
#[derive(Clone, Debug, Deserialize)]
pub struct GlossaryDocument {
    pub version: String,
    pub work_items: WorkItemRange,
    #[serde(default)]
    pub lines: Vec<String>,
    #[serde(default)]
    pub accounts: Vec<String>,
    #[serde(default)]
    pub pdv_codes: Vec<String>,
    #[serde(default)]
    pub incompatibilities: Vec<RuleDocument>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RuleDocument {
    pub line: String,
    pub forbidden_account_prefix: String,
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::{GlossaryError, GlossaryStore, BUILTIN_VERSION};

    const DOCUMENT: &str = r#"
version = "2024.1"
lines = ["zzventa", "ZZCOMPRA"]
accounts = ["E123456"]
pdv_codes = ["Pa", "17"]

[work_items]
min = 100
max = 200

[[incompatibilities]]
line = "zzventa"
forbidden_account_prefix = "E"
"#;

    #[test]
    fn builtin_store_matches_reference_data() {
        let store = GlossaryStore::builtin();

        assert_eq!(store.version(), BUILTIN_VERSION);
        assert!(store.is_work_item_in_range(10_001));
        assert!(store.is_work_item_in_range(65_535));
        assert!(!store.is_work_item_in_range(10_000));
        assert!(!store.is_work_item_in_range(65_536));
        assert!(store.is_valid_line("ZZCAMPREC"));
        assert!(!store.is_valid_line("zzcamprec"));
        assert!(store.is_valid_account("I741351"));
        assert!(store.is_valid_pdv("Pa"));
        assert!(!store.is_valid_pdv("pa"));
        assert_eq!(store.incompatibility_rules().len(), 1);
    }

    #[test]
    fn toml_document_is_normalized_on_load() {
        let store = GlossaryStore::from_toml_str(DOCUMENT).expect("document should load");

        assert_eq!(store.version(), "2024.1");
        assert!(store.is_valid_line("ZZVENTA"));
        assert!(store.is_valid_pdv("17"));
        assert!(!store.is_work_item_in_range(201));
        assert_eq!(store.incompatibility_rules()[0].line, "ZZVENTA");
        assert!(store.incompatibility_rules()[0].forbids("E123456"));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let raw = DOCUMENT.replace("min = 100", "min = 300");
        let error = GlossaryStore::from_toml_str(&raw).expect_err("range should be rejected");
        assert!(matches!(error, GlossaryError::InvertedRange { min: 300, max: 200 }));
    }

    #[test]
    fn duplicate_lines_are_detected_after_uppercasing() {
        let raw = DOCUMENT.replace(r#""ZZCOMPRA""#, r#""ZZVENTA""#);
        let error = GlossaryStore::from_toml_str(&raw).expect_err("duplicate should be rejected");
        assert!(matches!(
            error,
            GlossaryError::DuplicateEntry { set: "line", ref value } if value == "ZZVENTA"
        ));
    }

    #[test]
    fn line_entries_are_trimmed_like_rule_lines() {
        let raw = DOCUMENT.replace(r#""ZZCOMPRA""#, r#"" zzcompra ""#);
        let store = GlossaryStore::from_toml_str(&raw).expect("document should load");
        assert!(store.is_valid_line("ZZCOMPRA"));

        let padded_duplicate = DOCUMENT.replace(r#""ZZCOMPRA""#, r#""ZZVENTA ""#);
        assert!(GlossaryStore::from_toml_str(&padded_duplicate).is_err());
    }

    #[test]
    fn empty_rule_prefix_is_rejected() {
        let raw = DOCUMENT.replace(r#"forbidden_account_prefix = "E""#, r#"forbidden_account_prefix = """#);
        let error = GlossaryStore::from_toml_str(&raw).expect_err("rule should be rejected");
        assert!(matches!(
            error,
            GlossaryError::IncompleteRule { index: 0, field: "forbidden_account_prefix" }
        ));
    }

    #[test]
    fn load_reports_missing_file_path() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("missing.toml");
        let error = GlossaryStore::load(&path).expect_err("missing file should fail");
        assert!(error.to_string().contains("missing.toml"));
    }

    #[test]
    fn load_reads_document_from_disk() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("glossary.toml");
        fs::write(&path, DOCUMENT).expect("write glossary");

        let store = GlossaryStore::load(&path).expect("glossary should load");
        assert_eq!(store.summary().pdv_count, 2);
        assert_eq!(store.summary().line_count, 2);
    }
}
