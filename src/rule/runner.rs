//! Runner that checks and fixes files.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::fixer::{FixError, Fixer};
use crate::parser::{ParsedSource, PhpTokenizer, Tokenizer};
use crate::tokens::TokenList;

use super::diagnostics::FileReport;
use super::scanner::scan_hook_calls;
use super::sniff::CommentHooksRule;
use super::suppress::SuppressionSet;
use super::types::{Finding, FindingCode, Severity, SuppressedFinding};

/// Upper bound on fix passes per file.
pub const MAX_FIX_PASSES: usize = 50;

/// Result of fixing one source text.
#[derive(Debug)]
pub struct FixOutcome {
    pub source: String,
    /// Passes whose output was kept.
    pub passes: usize,
    /// Changesets applied across all kept passes.
    pub fixed: usize,
    /// Findings that remain in `source`.
    pub report: FileReport,
}

impl FixOutcome {
    pub fn changed(&self) -> bool {
        self.fixed > 0
    }
}

/// Outcome for one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub path: String,
    pub findings: Vec<Finding>,
    pub suppressed: Vec<SuppressedFinding>,
    pub fixed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileResult {
    fn from_report(report: FileReport, fixed: usize) -> Self {
        Self {
            path: report.path,
            findings: report.findings,
            suppressed: report.suppressed,
            fixed,
            error: None,
        }
    }

    fn failed(path: String, error: String) -> Self {
        Self {
            path,
            findings: Vec::new(),
            suppressed: Vec::new(),
            fixed: 0,
            error: Some(error),
        }
    }
}

/// Aggregated results of a run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RunResult {
    pub files: Vec<FileResult>,
}

impl RunResult {
    fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.files.iter().flat_map(|f| f.findings.iter())
    }

    pub fn files_scanned(&self) -> usize {
        self.files.len()
    }

    pub fn error_count(&self) -> usize {
        self.findings().filter(|f| f.severity == Severity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.findings().filter(|f| f.severity == Severity::Warning).count()
    }

    pub fn fixable_count(&self) -> usize {
        self.findings().filter(|f| f.fixable).count()
    }

    pub fn fixed_count(&self) -> usize {
        self.files.iter().map(|f| f.fixed).sum()
    }

    pub fn suppressed_count(&self) -> usize {
        self.files.iter().map(|f| f.suppressed.len()).sum()
    }

    /// Files that could not be read or tokenized.
    pub fn failed_files(&self) -> impl Iterator<Item = &FileResult> {
        self.files.iter().filter(|f| f.error.is_some())
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

/// Checks and fixes PHP sources with the hook documentation rule.
pub struct Runner {
    rule: CommentHooksRule,
    tokenizer: Box<dyn Tokenizer>,
}

impl Runner {
    pub fn new(config: Config) -> Self {
        Self {
            rule: CommentHooksRule::new(config),
            tokenizer: Box::new(PhpTokenizer),
        }
    }

    /// Use another tokenizer.
    pub fn tokenizer(mut self, tokenizer: Box<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn config(&self) -> &Config {
        self.rule.config()
    }

    fn parse(&self, source: &str) -> anyhow::Result<ParsedSource> {
        Ok(self.tokenizer.tokenize(source)?)
    }

    fn new_report(&self, path: &str, tokens: &TokenList) -> FileReport {
        FileReport::new(path).with_suppressions(SuppressionSet::collect(tokens, &self.config().rule_name))
    }

    /// Check an already tokenized stream.
    pub fn check_tokens(&self, path: &str, tokens: &TokenList) -> FileReport {
        let mut report = self.new_report(path, tokens);
        self.rule.check(tokens, &mut report);
        report
    }

    pub fn check_source(&self, path: &str, source: &str) -> anyhow::Result<FileReport> {
        let parsed = self.parse(source)?;
        Ok(self.check_tokens(path, &parsed.tokens))
    }

    /// Fix a source text: run the rule with fixing enabled, re-tokenize
    /// the output, and repeat until a pass changes nothing. A pass whose
    /// output gains syntax errors is thrown away.
    pub fn fix_source(&self, path: &str, source: &str) -> anyhow::Result<FixOutcome> {
        let mut parsed = self.parse(source)?;
        let baseline_errors = parsed.has_errors;
        let mut current = source.to_string();
        let mut passes = 0;
        let mut fixed = 0;

        while passes < MAX_FIX_PASSES {
            let mut report = self
                .new_report(path, &parsed.tokens)
                .with_fixer(Fixer::new(&parsed.tokens));
            self.rule.check(&parsed.tokens, &mut report);

            let Some(fixer) = report.take_fixer().filter(Fixer::is_changed) else {
                break;
            };
            let candidate = fixer.render();
            if candidate == current {
                break;
            }
            let reparsed = self.parse(&candidate)?;
            if reparsed.has_errors && !baseline_errors {
                warn!(path, error = %FixError::InvalidOutput, "discarding fix pass");
                break;
            }

            let attempted = self.site_findings(&parsed.tokens, report.fixed_findings());
            let after = self.check_tokens(path, &reparsed.tokens);
            let remaining = self.site_findings(&reparsed.tokens, after.findings.iter());
            if let Some((site, code)) = attempted.intersection(&remaining).next() {
                warn!(path, site, code = %code, "fix made no progress, discarding pass");
                break;
            }

            passes += 1;
            fixed += fixer.committed();
            debug!(path, pass = passes, changesets = fixer.committed(), "fix pass applied");
            current = candidate;
            parsed = reparsed;
        }

        if passes == MAX_FIX_PASSES {
            warn!(path, passes, "fix loop did not converge");
        }

        let report = self.check_tokens(path, &parsed.tokens);
        Ok(FixOutcome {
            source: current,
            passes,
            fixed,
            report,
        })
    }

    /// Key findings by the ordinal of their hook call. Fixes only add or
    /// rewrite comments, so ordinals stay stable across passes while
    /// token indices and lines shift.
    fn site_findings<'a>(
        &self,
        tokens: &TokenList,
        findings: impl Iterator<Item = &'a Finding>,
    ) -> HashSet<(usize, FindingCode)> {
        let sites: Vec<usize> = scan_hook_calls(tokens, &self.config().hooks)
            .map(|s| s.token_index)
            .collect();
        findings
            .filter_map(|f| {
                sites
                    .iter()
                    .position(|&s| s == f.token_index)
                    .map(|ordinal| (ordinal, f.code))
            })
            .collect()
    }

    pub fn check_file(&self, path: &Path) -> FileResult {
        let path_str = path.to_string_lossy().to_string();
        let result = fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|source| self.check_source(&path_str, &source));
        match result {
            Ok(report) => FileResult::from_report(report, 0),
            Err(e) => {
                warn!(path = %path_str, error = %e, "skipping file");
                FileResult::failed(path_str, e.to_string())
            }
        }
    }

    /// Fix one file, writing it back unless `dry_run`.
    pub fn fix_file(&self, path: &Path, dry_run: bool) -> FileResult {
        let path_str = path.to_string_lossy().to_string();
        let result = fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|source| {
                let outcome = self.fix_source(&path_str, &source)?;
                if outcome.changed() && !dry_run {
                    fs::write(path, &outcome.source)?;
                    info!(path = %path_str, fixed = outcome.fixed, "file fixed");
                }
                Ok(outcome)
            });
        match result {
            Ok(outcome) => FileResult::from_report(outcome.report, outcome.fixed),
            Err(e) => {
                warn!(path = %path_str, error = %e, "skipping file");
                FileResult::failed(path_str, e.to_string())
            }
        }
    }

    /// Check files in parallel. Results are sorted by path.
    pub fn check_files(&self, files: &[PathBuf]) -> RunResult {
        let mut results: Vec<FileResult> = files.par_iter().map(|f| self.check_file(f)).collect();
        results.sort_by(|a, b| a.path.cmp(&b.path));
        RunResult { files: results }
    }

    /// Fix files in parallel. Results are sorted by path.
    pub fn fix_files(&self, files: &[PathBuf], dry_run: bool) -> RunResult {
        let mut results: Vec<FileResult> = files
            .par_iter()
            .map(|f| self.fix_file(f, dry_run))
            .collect();
        results.sort_by(|a, b| a.path.cmp(&b.path));
        RunResult { files: results }
    }
}
