//! Core types for rule findings.

use phf::phf_map;
use serde::{Deserialize, Serialize};

/// Severity levels for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Stable finding codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindingCode {
    MissingHookComment,
    HookCommentWrongStyle,
    MissingSinceComment,
}

/// Static metadata for a finding code.
pub struct CodeInfo {
    pub code: FindingCode,
    pub summary: &'static str,
}

static CODES: phf::Map<&'static str, CodeInfo> = phf_map! {
    "MissingHookComment" => CodeInfo {
        code: FindingCode::MissingHookComment,
        summary: "hook call without a docblock on the line above",
    },
    "HookCommentWrongStyle" => CodeInfo {
        code: FindingCode::HookCommentWrongStyle,
        summary: "hook documented with a line or block comment instead of a docblock",
    },
    "MissingSinceComment" => CodeInfo {
        code: FindingCode::MissingSinceComment,
        summary: "hook docblock without a version tag",
    },
};

impl FindingCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingCode::MissingHookComment => "MissingHookComment",
            FindingCode::HookCommentWrongStyle => "HookCommentWrongStyle",
            FindingCode::MissingSinceComment => "MissingSinceComment",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        CODES.get(s).map(|info| info.code)
    }

    /// One-line description used in reports.
    pub fn summary(&self) -> &'static str {
        CODES
            .get(self.as_str())
            .map(|info| info.summary)
            .unwrap_or("")
    }

    /// The diagnostic message for this code.
    pub fn message(&self, version_tag: &str) -> String {
        match self {
            FindingCode::MissingHookComment => "A hook was found, but was not accompanied by a docblock comment on the line above to clarify the meaning of the hook.".to_string(),
            FindingCode::HookCommentWrongStyle => {
                "A \"hook\" comment must be a \"/**\" style docblock comment.".to_string()
            }
            FindingCode::MissingSinceComment => format!(
                "Docblock comment was found for the hook but does not contain a \"{}\" versioning.",
                version_tag
            ),
        }
    }
}

impl std::fmt::Display for FindingCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single reported issue at a hook call site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub token_index: usize,
    pub line: usize,
    pub severity: Severity,
    pub code: FindingCode,
    pub message: String,
    pub fixable: bool,
}

/// A finding silenced by an inline pragma.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuppressedFinding {
    pub finding: Finding,
    /// Line of the pragma comment responsible.
    pub pragma_line: usize,
}
