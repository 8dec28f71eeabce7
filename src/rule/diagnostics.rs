//! Per-file diagnostic sink.
//!
//! Rules report through [`FileReport`]; it applies inline suppressions and
//! decides whether a fixable finding should actually be fixed in this run.

use tracing::{debug, warn};

use crate::fixer::Fixer;
use crate::tokens::Token;

use super::changeset::Changeset;
use super::classify::Classification;
use super::suppress::SuppressionSet;
use super::types::{Finding, FindingCode, Severity, SuppressedFinding};

/// Map a classified call site to its finding code; `None` means compliant.
pub fn diagnose(classification: &Classification, has_version_tag: bool) -> Option<FindingCode> {
    match classification {
        Classification::Absent => Some(FindingCode::MissingHookComment),
        Classification::WrongStyle { .. } => Some(FindingCode::HookCommentWrongStyle),
        Classification::DocBlock { .. } if has_version_tag => None,
        Classification::DocBlock { .. } => Some(FindingCode::MissingSinceComment),
    }
}

/// Findings of one file, plus the fixer when running in fix mode.
#[derive(Debug, Default)]
pub struct FileReport {
    pub path: String,
    pub findings: Vec<Finding>,
    pub suppressed: Vec<SuppressedFinding>,
    suppressions: SuppressionSet,
    fixer: Option<Fixer>,
    fixed_sites: Vec<usize>,
}

impl FileReport {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_suppressions(mut self, suppressions: SuppressionSet) -> Self {
        self.suppressions = suppressions;
        self
    }

    /// Enable fixing for this report.
    pub fn with_fixer(mut self, fixer: Fixer) -> Self {
        self.fixer = Some(fixer);
        self
    }

    pub fn is_fixing(&self) -> bool {
        self.fixer.is_some()
    }

    /// Record a finding unless a pragma silences it. Returns whether it is active.
    fn record(&mut self, token: &Token, severity: Severity, code: FindingCode, message: String, fixable: bool) -> bool {
        let finding = Finding {
            token_index: token.index,
            line: token.line,
            severity,
            code,
            message,
            fixable,
        };
        if let Some(suppression) = self.suppressions.find(&finding) {
            debug!(path = %self.path, line = finding.line, code = %code, "finding suppressed");
            let pragma_line = suppression.line;
            self.suppressed.push(SuppressedFinding { finding, pragma_line });
            return false;
        }
        self.findings.push(finding);
        true
    }

    pub fn add_error(&mut self, message: impl Into<String>, token: &Token, code: FindingCode) -> bool {
        self.record(token, Severity::Error, code, message.into(), false)
    }

    pub fn add_warning(&mut self, message: impl Into<String>, token: &Token, code: FindingCode) -> bool {
        self.record(token, Severity::Warning, code, message.into(), false)
    }

    /// Record a fixable error. Returns true when the caller should build and
    /// apply its fix now: the finding is active and this run is fixing.
    pub fn add_fixable_error(&mut self, message: impl Into<String>, token: &Token, code: FindingCode) -> bool {
        self.record(token, Severity::Error, code, message.into(), true) && self.is_fixing()
    }

    /// Apply the changeset for the finding just recorded. Returns whether
    /// it was committed.
    pub fn apply_fix(&mut self, changeset: &Changeset) -> bool {
        let Some(fixer) = self.fixer.as_mut() else {
            return false;
        };
        match fixer.apply(changeset) {
            Ok(()) => {
                if let Some(finding) = self.findings.last() {
                    self.fixed_sites.push(finding.token_index);
                }
                true
            }
            Err(e) => {
                warn!(path = %self.path, error = %e, "fix not applied");
                false
            }
        }
    }

    /// Findings whose changeset was committed in this run.
    pub fn fixed_findings(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| self.fixed_sites.contains(&f.token_index))
    }

    pub fn take_fixer(&mut self) -> Option<Fixer> {
        self.fixer.take()
    }

    pub fn error_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
            .count()
    }

    pub fn fixable_count(&self) -> usize {
        self.findings.iter().filter(|f| f.fixable).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tokenize;
    use crate::rule::resolver::CommentDialect;
    use crate::tokens::{TokenKind, TokenStream};

    #[test]
    fn test_diagnose_mapping() {
        assert_eq!(
            diagnose(&Classification::Absent, false),
            Some(FindingCode::MissingHookComment)
        );
        let wrong = Classification::WrongStyle {
            dialect: CommentDialect::LineComment,
            start: Some(1),
            end: 1,
        };
        assert_eq!(diagnose(&wrong, true), Some(FindingCode::HookCommentWrongStyle));
        let doc = Classification::DocBlock { open: 1, close: 5 };
        assert_eq!(diagnose(&doc, false), Some(FindingCode::MissingSinceComment));
        assert_eq!(diagnose(&doc, true), None);
    }

    #[test]
    fn test_fixable_error_requires_fixer() {
        let list = tokenize("<?php\ndo_action( 'x' );\n").unwrap().tokens;
        let call = list.find_next(&[TokenKind::CallIdentifier], 0, None, false).unwrap();
        let token = &list.tokens()[call];

        let mut checking = FileReport::new("a.php");
        assert!(!checking.add_fixable_error("m", token, FindingCode::MissingHookComment));
        assert_eq!(checking.fixable_count(), 1);

        let mut fixing = FileReport::new("a.php").with_fixer(Fixer::new(&list));
        assert!(fixing.add_fixable_error("m", token, FindingCode::MissingHookComment));
        assert_eq!(fixing.error_count(), 1);
    }

    #[test]
    fn test_suppressed_finding_is_not_fixed() {
        let list = tokenize("<?php\n// phpcs:ignore WooCommerce\ndo_action( 'x' );\n")
            .unwrap()
            .tokens;
        let call = list.find_next(&[TokenKind::CallIdentifier], 0, None, false).unwrap();
        let mut report = FileReport::new("a.php")
            .with_suppressions(SuppressionSet::collect(&list, "WooCommerce.Commenting.CommentHooks"))
            .with_fixer(Fixer::new(&list));

        assert!(!report.add_fixable_error("m", &list.tokens()[call], FindingCode::MissingHookComment));
        assert!(report.findings.is_empty());
        assert_eq!(report.suppressed.len(), 1);
        assert_eq!(report.suppressed[0].pragma_line, 2);
    }

    #[test]
    fn test_warnings_are_counted_separately() {
        let list = tokenize("<?php\ndo_action( 'x' );\n").unwrap().tokens;
        let mut report = FileReport::new("a.php");
        assert!(report.add_warning("m", &list.tokens()[0], FindingCode::MissingHookComment));
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.fixable_count(), 0);
    }
}
