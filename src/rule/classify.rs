//! Comment style classification.

use lazy_static::lazy_static;
use regex::Regex;

use super::resolver::{CommentContext, CommentDialect};

lazy_static! {
    /// `/* translators: ... */` notes for i18n tooling.
    static ref TRANSLATOR_PATTERN: Regex =
        Regex::new(r"(?i)^(?://|#|/\*)\s*translators:").unwrap();

    /// Coding-standards pragmas: `// phpcs:ignore`, `// WPCS: XSS ok`,
    /// legacy `// @codingStandardsIgnoreLine`.
    static ref PRAGMA_PATTERN: Regex =
        Regex::new(r"(?i)^(?://|#|/\*)\s*(?:(?:phpcs|wpcs)\s*:|@codingStandards)").unwrap();
}

/// Kinds of comment that may sit between a hook and its doc-block without
/// being its documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationKind {
    Translator,
    Pragma,
}

/// Identify an annotation comment from its first line.
pub fn annotation_kind(text: &str) -> Option<AnnotationKind> {
    let text = text.trim_start();
    if TRANSLATOR_PATTERN.is_match(text) {
        Some(AnnotationKind::Translator)
    } else if PRAGMA_PATTERN.is_match(text) {
        Some(AnnotationKind::Pragma)
    } else {
        None
    }
}

pub fn is_annotation(text: &str) -> bool {
    annotation_kind(text).is_some()
}

/// Shape of the documentation attached to a hook call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// No comment directly above the call.
    Absent,
    /// A `//`, `#` or `/* */` comment directly above the call.
    WrongStyle {
        dialect: CommentDialect,
        /// First token of the comment, when its opener was found.
        start: Option<usize>,
        end: usize,
    },
    /// A `/** */` doc-block directly above the call.
    DocBlock { open: usize, close: usize },
}

pub fn classify(ctx: &CommentContext) -> Classification {
    if !ctx.is_adjacent() {
        return Classification::Absent;
    }
    match (ctx.dialect, ctx.preceding_token_index) {
        (Some(CommentDialect::DocBlock), Some(close)) => match ctx.start_index {
            Some(open) => Classification::DocBlock { open, close },
            None => Classification::Absent,
        },
        (Some(dialect), Some(end)) => Classification::WrongStyle {
            dialect,
            start: ctx.start_index,
            end,
        },
        _ => Classification::Absent,
    }
}
