use std::fmt;

use serde::Serialize;

use crate::glossary::WorkItemRange;

/// A validation finding. Findings are data: malformed input is the expected
/// case and is reported, never raised.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    OutOfRangeWorkItem { value: u64, range: WorkItemRange },
    MalformedWorkItem { raw: String },
    UnknownAccount { code: String },
    UnknownLine { raw: String },
    UnknownPdv { code: String },
    IncompatibleCombination { line: String, account: String },
}

impl Finding {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OutOfRangeWorkItem { .. } => "out_of_range_work_item",
            Self::MalformedWorkItem { .. } => "malformed_work_item",
            Self::UnknownAccount { .. } => "unknown_account",
            Self::UnknownLine { .. } => "unknown_line",
            Self::UnknownPdv { .. } => "unknown_pdv",
            Self::IncompatibleCombination { .. } => "incompatible_combination",
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRangeWorkItem { value, range } => {
                write!(f, "Work item {value} out of range ({}-{})", range.min, range.max)
            }
            Self::MalformedWorkItem { raw } => write!(f, "Work item {raw} is not a valid number"),
            Self::UnknownAccount { code } => write!(f, "Account {code} not valid"),
            Self::UnknownLine { raw } => write!(f, "Line {raw} not recognized"),
            Self::UnknownPdv { code } => write!(f, "Point of sale {code} not valid"),
            Self::IncompatibleCombination { line, account } => {
                write!(f, "Line {line} incompatible with account {account}")
            }
        }
    }
}
