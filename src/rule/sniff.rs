//! The hook documentation rule.

use tracing::{debug, trace};

use crate::config::{Config, StrictMode};
use crate::tokens::{TokenKind, TokenStream};

use super::changeset::{Changeset, ChangesetBuilder};
use super::classify::{classify, Classification};
use super::diagnostics::{diagnose, FileReport};
use super::resolver::resolve;
use super::scanner::{is_hook_call, scan_hook_calls};
use super::version::has_version_tag;

/// Checks that every hook call carries a `/** */` doc-block with a version tag.
#[derive(Debug, Clone, Default)]
pub struct CommentHooksRule {
    config: Config,
}

impl CommentHooksRule {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Token kinds this rule wants to be called for.
    pub fn register(&self) -> &'static [TokenKind] {
        &[TokenKind::CallIdentifier]
    }

    /// Check one token. Non-hook tokens are ignored; a hook call yields at
    /// most one finding and, when fixing, at most one changeset.
    pub fn process<S: TokenStream + ?Sized>(&self, stream: &S, index: usize, report: &mut FileReport) {
        if !is_hook_call(stream, index, &self.config.hooks) {
            return;
        }
        let token = &stream.tokens()[index];
        let ctx = resolve(stream, index);
        let classification = classify(&ctx);
        trace!(line = token.line, ?classification, "hook call classified");

        let version_present = match classification {
            Classification::DocBlock { open, close } => {
                has_version_tag(stream, open, close, &self.config.version_tag)
            }
            _ => false,
        };
        let Some(code) = diagnose(&classification, version_present) else {
            debug!(line = token.line, hook = %token.content, "hook documented");
            return;
        };

        let builder = ChangesetBuilder::new(stream, &self.config);
        let fix: Option<Changeset> = match classification {
            Classification::Absent => builder.missing_comment(index, &ctx),
            Classification::WrongStyle { dialect, start, end } => builder.wrong_style(index, dialect, start, end),
            Classification::DocBlock { open, close } => builder.missing_version_tag(open, close),
        };
        let message = code.message(&self.config.version_tag);

        match (self.config.strict_mode, fix) {
            (StrictMode::Warn, _) => {
                report.add_warning(message, token, code);
            }
            (StrictMode::ErrorWithFix, Some(changeset)) => {
                if report.add_fixable_error(message, token, code) {
                    report.apply_fix(&changeset);
                }
            }
            (StrictMode::ErrorWithFix, None) => {
                report.add_error(message, token, code);
            }
        }
    }

    /// Run the rule over every hook call in the stream.
    pub fn check<S: TokenStream + ?Sized>(&self, stream: &S, report: &mut FileReport) {
        for site in scan_hook_calls(stream, &self.config.hooks) {
            self.process(stream, site.token_index, report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixer::Fixer;
    use crate::parser::tokenize;
    use crate::rule::types::{FindingCode, Severity};

    fn check(source: &str, config: Config) -> FileReport {
        let list = tokenize(source).unwrap().tokens;
        let mut report = FileReport::new("test.php");
        CommentHooksRule::new(config).check(&list, &mut report);
        report
    }

    fn codes(report: &FileReport) -> Vec<FindingCode> {
        report.findings.iter().map(|f| f.code).collect()
    }

    #[test]
    fn test_register() {
        assert_eq!(CommentHooksRule::default().register(), &[TokenKind::CallIdentifier]);
    }

    #[test]
    fn test_documented_hook_is_clean() {
        let report = check(
            "<?php\n/**\n * Fires after init.\n *\n * @since 1.0.0\n */\ndo_action( 'x' );\n",
            Config::default(),
        );
        assert!(report.findings.is_empty());
    }

    #[test]
    fn test_each_shape_yields_one_finding() {
        let report = check(
            "<?php\ndo_action( 'a' );\n\n// Fires b.\ndo_action( 'b' );\n\n/**\n * Filters c.\n */\n$c = apply_filters( 'c', 1 );\n",
            Config::default(),
        );
        assert_eq!(
            codes(&report),
            vec![
                FindingCode::MissingHookComment,
                FindingCode::HookCommentWrongStyle,
                FindingCode::MissingSinceComment,
            ]
        );
        assert_eq!(report.findings[0].line, 2);
        assert_eq!(report.findings[1].line, 5);
        assert_eq!(report.findings[2].line, 10);
        assert!(report.findings.iter().all(|f| f.severity == Severity::Error && f.fixable));
    }

    #[test]
    fn test_non_hook_calls_are_ignored() {
        let report = check("<?php\nadd_action( 'init', 'f' );\nfoo( 1 );\n", Config::default());
        assert!(report.findings.is_empty());
    }

    #[test]
    fn test_single_line_doc_block_is_unfixable_error() {
        let report = check("<?php\n/** Fires. */\ndo_action( 'x' );\n", Config::default());
        assert_eq!(codes(&report), vec![FindingCode::MissingSinceComment]);
        assert!(!report.findings[0].fixable);
    }

    #[test]
    fn test_warn_mode() {
        let config = Config {
            strict_mode: StrictMode::Warn,
            ..Config::default()
        };
        let list = tokenize("<?php\ndo_action( 'x' );\n").unwrap().tokens;
        let mut report = FileReport::new("test.php").with_fixer(Fixer::new(&list));
        CommentHooksRule::new(config).check(&list, &mut report);

        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.fixable_count(), 0);
        let fixer = report.take_fixer().unwrap();
        assert!(!fixer.is_changed());
    }

    #[test]
    fn test_process_fixes_in_one_changeset() {
        let list = tokenize("<?php\n\t// fires x\n\tdo_action( 'x' );\n").unwrap().tokens;
        let mut report = FileReport::new("test.php").with_fixer(Fixer::new(&list));
        let rule = CommentHooksRule::default();
        let call = list.find_next(&[TokenKind::CallIdentifier], 0, None, false).unwrap();
        rule.process(&list, call, &mut report);

        let fixer = report.take_fixer().unwrap();
        assert_eq!(fixer.committed(), 1);
        assert_eq!(
            fixer.render(),
            "<?php\n\t/**\n\t * Fires x.\n\t *\n\t * @since\n\t */\n\tdo_action( 'x' );\n"
        );
    }

    #[test]
    fn test_custom_version_tag() {
        let config = Config {
            version_tag: "@version".to_string(),
            ..Config::default()
        };
        let report = check(
            "<?php\n/**\n * Fires.\n *\n * @since 1.0\n */\ndo_action( 'x' );\n",
            config,
        );
        assert_eq!(codes(&report), vec![FindingCode::MissingSinceComment]);
        assert!(report.findings[0].message.contains("@version"));
    }
}
