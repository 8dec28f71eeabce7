//! Inline suppression of findings via `phpcs:` pragma comments.
//!
//! Supports:
//! - `// phpcs:ignore <codes> -- <reason>` (alone on a line: the next line;
//!   after code: its own line)
//! - `// phpcs:disable <codes>` ... `// phpcs:enable <codes>`
//! - `// phpcs:ignoreFile`
//!
//! A code list such as `WooCommerce.Commenting` matches every finding whose
//! full code (`<rule_name>.<Code>`) starts with it on a `.` boundary. An
//! empty list matches everything.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::tokens::{TokenKind, TokenStream};

use super::types::{Finding, FindingCode};

/// How a suppression applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressionType {
    /// Applies to the pragma's own line
    Line,
    /// Applies to the line after the pragma
    NextLine,
    /// Applies from a `disable` up to the matching `enable`
    Range,
    /// Applies to the entire file
    File,
}

/// An inline suppression directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suppression {
    /// Code prefixes to suppress; empty for all
    pub codes: Vec<String>,
    /// Text after `--`
    pub reason: String,
    /// Line of the pragma comment
    pub line: usize,
    /// Line of the closing `enable` for ranges; `None` runs to end of file
    pub end_line: Option<usize>,
    pub suppression_type: SuppressionType,
}

impl Suppression {
    fn covers_line(&self, line: usize) -> bool {
        match self.suppression_type {
            SuppressionType::File => true,
            SuppressionType::Line => line == self.line,
            SuppressionType::NextLine => line == self.line + 1,
            SuppressionType::Range => line >= self.line && self.end_line.map_or(true, |end| line < end),
        }
    }

    fn covers_code(&self, full_code: &str) -> bool {
        self.codes.is_empty() || self.codes.iter().any(|c| code_matches(c, full_code))
    }
}

lazy_static! {
    static ref PRAGMA_PATTERN: Regex =
        Regex::new(r"(?i)^(?://|#|/\*)\s*phpcs:(ignorefile|ignore|disable|enable)\b(.*)$").unwrap();
}

/// Whether a pragma code prefix matches a full dotted code.
pub fn code_matches(prefix: &str, full_code: &str) -> bool {
    let prefix = prefix.to_ascii_lowercase();
    let full_code = full_code.to_ascii_lowercase();
    full_code == prefix || full_code.starts_with(&format!("{}.", prefix))
}

fn parse_directive(content: &str) -> Option<(String, Vec<String>, String)> {
    let caps = PRAGMA_PATTERN.captures(content.trim())?;
    let directive = caps.get(1)?.as_str().to_ascii_lowercase();
    let rest = caps.get(2).map(|m| m.as_str()).unwrap_or("").trim();
    let rest = rest.strip_suffix("*/").unwrap_or(rest);
    let (codes, reason) = match rest.split_once("--") {
        Some((codes, reason)) => (codes, reason.trim()),
        None => (rest, ""),
    };
    let codes = codes
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    Some((directive, codes, reason.to_string()))
}

/// Parse suppression directives from the comments of a token stream.
pub fn parse_suppressions<S: TokenStream + ?Sized>(stream: &S) -> Vec<Suppression> {
    let mut suppressions: Vec<Suppression> = Vec::new();
    let mut open_ranges: Vec<usize> = Vec::new();

    for token in stream.tokens() {
        if !matches!(token.kind, TokenKind::LineComment | TokenKind::BlockComment) {
            continue;
        }
        let Some((directive, codes, reason)) = parse_directive(&token.content) else {
            continue;
        };

        let suppression_type = match directive.as_str() {
            "ignorefile" => SuppressionType::File,
            "ignore" if stream.first_on_line(token.index) => SuppressionType::NextLine,
            "ignore" => SuppressionType::Line,
            "disable" => {
                open_ranges.push(suppressions.len());
                SuppressionType::Range
            }
            "enable" => {
                open_ranges.retain(|&i| {
                    let range = &mut suppressions[i];
                    let closes = codes.is_empty()
                        || (!range.codes.is_empty()
                            && range.codes.iter().all(|c| codes.iter().any(|e| code_matches(e, c))));
                    if closes {
                        range.end_line = Some(token.line);
                    }
                    !closes
                });
                continue;
            }
            _ => continue,
        };

        suppressions.push(Suppression {
            codes,
            reason,
            line: token.line,
            end_line: None,
            suppression_type,
        });
    }

    suppressions
}

/// The suppressions of one file, bound to a rule name.
#[derive(Debug, Clone, Default)]
pub struct SuppressionSet {
    rule_name: String,
    suppressions: Vec<Suppression>,
}

impl SuppressionSet {
    pub fn collect<S: TokenStream + ?Sized>(stream: &S, rule_name: &str) -> Self {
        Self {
            rule_name: rule_name.to_string(),
            suppressions: parse_suppressions(stream),
        }
    }

    /// Dotted code a pragma has to name, e.g. `WooCommerce.Commenting.CommentHooks.MissingHookComment`.
    pub fn full_code(&self, code: FindingCode) -> String {
        format!("{}.{}", self.rule_name, code.as_str())
    }

    /// The suppression silencing `finding`, if any.
    pub fn find(&self, finding: &Finding) -> Option<&Suppression> {
        let full_code = self.full_code(finding.code);
        self.suppressions
            .iter()
            .find(|s| s.covers_line(finding.line) && s.covers_code(&full_code))
    }

    pub fn is_empty(&self) -> bool {
        self.suppressions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.suppressions.len()
    }
}
