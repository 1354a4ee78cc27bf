use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_ARGUMENT_ROUNDS: u32 = 5;
pub const DEFAULT_JURISDICTION: &str = "Supreme Court";
pub const DEFAULT_CASE_CATEGORY: &str = "Civil";

/// Opaque case token issued by the filing backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaseId(pub String);

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Plaintiff,
    Defendant,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Plaintiff => "plaintiff",
            Side::Defendant => "defendant",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything the courtroom tracks separately for each party.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerSide<T> {
    pub plaintiff: T,
    pub defendant: T,
}

impl<T> PerSide<T> {
    pub fn side(&self, side: Side) -> &T {
        match side {
            Side::Plaintiff => &self.plaintiff,
            Side::Defendant => &self.defendant,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Plaintiff => &mut self.plaintiff,
            Side::Defendant => &mut self.defendant,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    #[default]
    Low,
}

impl Confidence {
    /// Maps the free-form confidence token the backend returns onto the
    /// tri-state scale. Anything that mentions neither HIGH nor MED is Low.
    pub fn from_token(token: &str) -> Self {
        let upper = token.to_ascii_uppercase();
        if upper.contains("HIGH") {
            Confidence::High
        } else if upper.contains("MED") {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Confidence::High => "HIGH",
            Confidence::Medium => "MEDIUM",
            Confidence::Low => "LOW",
        }
    }
}

/// The active case. Created on successful filing, destroyed on reset;
/// `documents` holds the per-side names the backend ingested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub case_id: CaseId,
    pub jurisdiction: String,
    pub category: String,
    pub documents: PerSide<Vec<String>>,
    pub filed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub side: Side,
    pub text: String,
    #[serde(default)]
    pub documents: Vec<String>,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub verdict: String,
    pub reasoning: String,
    pub confidence: Confidence,
    pub key_evidence: PerSide<Vec<String>>,
    #[serde(default)]
    pub precedents: Vec<String>,
    #[serde(default)]
    pub counterarguments: Vec<String>,
    pub suggested_next_arguments: PerSide<String>,
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
