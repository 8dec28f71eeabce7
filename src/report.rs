//! Output formatting for hookdoc results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};

use crate::rule::{Finding, FileResult, RunResult, Severity, SuppressedFinding};

/// Which command produced the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Check,
    Fix,
}

// =============================================================================
// JSON Format
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    pub mode: Mode,
    pub files_scanned: usize,
    pub errors: usize,
    pub warnings: usize,
    pub fixable: usize,
    pub fixed: usize,
    pub suppressed_count: usize,
    pub files: Vec<JsonFile>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonFile {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub fixed: usize,
    pub findings: Vec<JsonFinding>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suppressed: Vec<JsonSuppressedFinding>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonFinding {
    /// Full dotted code, e.g. `WooCommerce.Commenting.CommentHooks.MissingHookComment`.
    pub source: String,
    pub code: String,
    pub severity: String,
    pub line: usize,
    pub message: String,
    pub fixable: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonSuppressedFinding {
    pub finding: JsonFinding,
    pub pragma_line: usize,
}

fn finding_to_json(f: &Finding, rule_name: &str) -> JsonFinding {
    JsonFinding {
        source: format!("{}.{}", rule_name, f.code),
        code: f.code.to_string(),
        severity: f.severity.to_string(),
        line: f.line,
        message: f.message.clone(),
        fixable: f.fixable,
    }
}

fn file_to_json(file: &FileResult, rule_name: &str, with_suppressed: bool) -> JsonFile {
    JsonFile {
        path: file.path.clone(),
        error: file.error.clone(),
        fixed: file.fixed,
        findings: file
            .findings
            .iter()
            .map(|f| finding_to_json(f, rule_name))
            .collect(),
        suppressed: if with_suppressed {
            file.suppressed
                .iter()
                .map(|s| JsonSuppressedFinding {
                    finding: finding_to_json(&s.finding, rule_name),
                    pragma_line: s.pragma_line,
                })
                .collect()
        } else {
            Vec::new()
        },
    }
}

/// Build the JSON report. Files without findings are omitted unless they
/// failed or were fixed.
pub fn build_json_report(
    path: &str,
    mode: Mode,
    result: &RunResult,
    rule_name: &str,
    show_suppressed: bool,
) -> JsonReport {
    let files = result
        .files
        .iter()
        .filter(|f| {
            !f.findings.is_empty()
                || f.error.is_some()
                || f.fixed > 0
                || (show_suppressed && !f.suppressed.is_empty())
        })
        .map(|f| file_to_json(f, rule_name, show_suppressed))
        .collect();

    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        mode,
        files_scanned: result.files_scanned(),
        errors: result.error_count(),
        warnings: result.warning_count(),
        fixable: result.fixable_count(),
        fixed: result.fixed_count(),
        suppressed_count: result.suppressed_count(),
        files,
    }
}

/// Write results in JSON format.
pub fn write_json(
    path: &str,
    mode: Mode,
    result: &RunResult,
    rule_name: &str,
    show_suppressed: bool,
) -> anyhow::Result<()> {
    let report = build_json_report(path, mode, result, rule_name, show_suppressed);
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty(path: &str, mode: Mode, result: &RunResult, show_suppressed: bool) {
    // Header
    println!();
    print!("  ");
    print!("{}", "hookdoc".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Scanning: ".dimmed());
    println!("{}", path);
    print!("  {}", "Files:    ".dimmed());
    println!("{}", result.files_scanned());
    println!();

    for file in &result.files {
        write_file(file, mode, show_suppressed);
    }

    write_summary(mode, result);
    println!();
}

fn write_file(file: &FileResult, mode: Mode, show_suppressed: bool) {
    let show_fixed = mode == Mode::Fix && file.fixed > 0;
    let show_suppressed = show_suppressed && !file.suppressed.is_empty();
    if file.findings.is_empty() && file.error.is_none() && !show_fixed && !show_suppressed {
        return;
    }

    println!("  {}", file.path.blue().bold());

    if let Some(error) = &file.error {
        println!("    {} {}", "FAILED".red(), error);
    }
    if show_fixed {
        let plural = if file.fixed != 1 { "s" } else { "" };
        println!("    {}", format!("fixed {} finding{}", file.fixed, plural).green());
    }
    for f in &file.findings {
        write_finding(f);
    }
    if show_suppressed {
        write_suppressed(&file.suppressed);
    }
    println!();
}

fn write_finding(f: &Finding) {
    print!("    {}", format!("{:>5}", f.line).dimmed());
    print!(" ");
    write_severity_tag(&f.severity);
    let marker = if f.fixable { "[x]" } else { "[ ]" };
    print!(" {} ", marker.dimmed());
    println!("{}", f.message);
    println!("          {}", f.code.as_str().dimmed());
}

fn write_severity_tag(severity: &Severity) {
    match severity {
        Severity::Error => print!("{}", "ERROR".red()),
        Severity::Warning => print!("{}", "WARN ".yellow()),
    }
}

fn write_suppressed(suppressed: &[SuppressedFinding]) {
    for s in suppressed {
        println!(
            "    {}",
            format!(
                "{:>5} {} (suppressed by pragma on line {})",
                s.finding.line, s.finding.code, s.pragma_line
            )
            .dimmed()
        );
    }
}

fn write_summary(mode: Mode, result: &RunResult) {
    let errors = result.error_count();
    let warnings = result.warning_count();

    if errors == 0 && warnings == 0 {
        print!("  {}", "✓ PASS".green());
    } else if errors == 0 {
        print!("  {}", "! WARN".yellow());
    } else {
        print!("  {}", "✗ FAIL".red());
    }

    print!("  {} error(s), {} warning(s)", errors, warnings);

    match mode {
        Mode::Check if result.fixable_count() > 0 => print!(
            "  {}",
            format!("({} fixable with `hookdoc fix`)", result.fixable_count()).dimmed()
        ),
        Mode::Fix => print!("  {}", format!("{} fixed", result.fixed_count()).green()),
        Mode::Check => {}
    }

    let suppressed = result.suppressed_count();
    if suppressed > 0 {
        print!("  {}", format!("({} suppressed)", suppressed).dimmed());
    }

    let failed = result.failed_files().count();
    if failed > 0 {
        print!("  {}", format!("{} file(s) unreadable", failed).red());
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::FindingCode;

    fn sample() -> RunResult {
        let finding = Finding {
            token_index: 4,
            line: 2,
            severity: Severity::Error,
            code: FindingCode::MissingHookComment,
            message: FindingCode::MissingHookComment.message("@since"),
            fixable: true,
        };
        RunResult {
            files: vec![
                FileResult {
                    path: "a.php".to_string(),
                    findings: vec![finding.clone()],
                    suppressed: vec![SuppressedFinding {
                        finding,
                        pragma_line: 1,
                    }],
                    fixed: 0,
                    error: None,
                },
                FileResult {
                    path: "clean.php".to_string(),
                    findings: vec![],
                    suppressed: vec![],
                    fixed: 0,
                    error: None,
                },
            ],
        }
    }

    #[test]
    fn test_json_report_counts() {
        let report = build_json_report("src", Mode::Check, &sample(), "WooCommerce.Commenting.CommentHooks", false);
        assert_eq!(report.files_scanned, 2);
        assert_eq!(report.errors, 1);
        assert_eq!(report.fixable, 1);
        assert_eq!(report.suppressed_count, 1);
        // clean files are left out
        assert_eq!(report.files.len(), 1);
        assert!(report.files[0].suppressed.is_empty());
        assert_eq!(
            report.files[0].findings[0].source,
            "WooCommerce.Commenting.CommentHooks.MissingHookComment"
        );
    }

    #[test]
    fn test_json_field_names() {
        let report = build_json_report("src", Mode::Fix, &sample(), "Rule", true);
        let value = serde_json::to_value(&report).unwrap();
        for key in ["version", "path", "mode", "files_scanned", "errors", "warnings", "fixable", "fixed", "files"] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(value["mode"], "fix");
        assert_eq!(value["files"][0]["findings"][0]["severity"], "error");
        assert_eq!(value["files"][0]["suppressed"][0]["pragma_line"], 1);
    }
}
