//! Fix construction.
//!
//! Each finding maps to at most one [`Changeset`]: a group of token edits
//! that is applied all together or not at all. Builders only read the
//! stream; applying is the fixer's job.

use crate::config::Config;
use crate::tokens::{TokenKind, TokenStream};

use super::resolver::{CommentContext, CommentDialect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    /// Insert text before the anchor token.
    InsertBefore,
    /// Insert text after the anchor token.
    InsertAfter,
    /// Replace the anchor token's content.
    Replace,
}

/// A single token edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub anchor: usize,
    pub text: String,
    pub mode: EditMode,
}

/// Edits applied atomically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changeset {
    pub edits: Vec<Edit>,
}

impl Changeset {
    pub fn insert_before(&mut self, anchor: usize, text: impl Into<String>) {
        self.push(anchor, text, EditMode::InsertBefore);
    }

    pub fn insert_after(&mut self, anchor: usize, text: impl Into<String>) {
        self.push(anchor, text, EditMode::InsertAfter);
    }

    pub fn replace(&mut self, anchor: usize, text: impl Into<String>) {
        self.push(anchor, text, EditMode::Replace);
    }

    fn push(&mut self, anchor: usize, text: impl Into<String>, mode: EditMode) {
        self.edits.push(Edit {
            anchor,
            text: text.into(),
            mode,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }
}

/// Re-emit indentation: count columns (a tab counts `tab_width`) and write
/// whole units as `unit`, the remainder as spaces.
pub fn collapse_indent(whitespace: &str, tab_width: usize, unit: &str) -> String {
    let tab_width = tab_width.max(1);
    let width: usize = whitespace
        .chars()
        .map(|c| if c == '\t' { tab_width } else { 1 })
        .sum();
    format!("{}{}", unit.repeat(width / tab_width), " ".repeat(width % tab_width))
}

/// Turn free comment text into a summary sentence.
pub fn summary_sentence(text: &str, placeholder: &str) -> String {
    let text = text.trim().replace("*/", "* /");
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return placeholder.to_string();
    };
    let mut sentence: String = first.to_uppercase().chain(chars).collect();
    if !sentence.ends_with(['.', '!', '?', ':']) {
        sentence.push('.');
    }
    sentence
}

/// Text of a single-line `//`, `#` or `/* */` comment without its delimiters.
pub fn comment_text(content: &str) -> &str {
    let content = content.trim();
    if let Some(body) = content.strip_prefix("/*") {
        return body.strip_suffix("*/").unwrap_or(body).trim_start_matches('*').trim();
    }
    content
        .strip_prefix("//")
        .or_else(|| content.strip_prefix('#'))
        .unwrap_or(content)
        .trim()
}

/// Builds changesets against one token stream.
pub struct ChangesetBuilder<'a, S: TokenStream + ?Sized> {
    stream: &'a S,
    config: &'a Config,
}

impl<'a, S: TokenStream + ?Sized> ChangesetBuilder<'a, S> {
    pub fn new(stream: &'a S, config: &'a Config) -> Self {
        Self { stream, config }
    }

    fn padding(&self, site: usize) -> String {
        collapse_indent(
            self.stream.line_indent(site),
            self.config.tab_width,
            &self.config.indent_unit,
        )
    }

    fn scaffold(&self, summary: &str) -> [String; 5] {
        [
            "/**".to_string(),
            format!(" * {}", summary),
            " *".to_string(),
            format!(" * {}", self.config.version_tag),
            " */".to_string(),
        ]
    }

    /// The scaffold as one string: every line padded, lines joined by the
    /// stream's line ending, no trailing line ending.
    fn block(&self, site: usize, summary: &str) -> String {
        let pad = self.padding(site);
        self.scaffold(summary)
            .iter()
            .map(|line| format!("{}{}", pad, line))
            .collect::<Vec<_>>()
            .join(self.stream.eol())
    }

    /// Blank the whitespace token directly before `index` if it is on the same line.
    fn blank_preceding_whitespace(&self, index: usize, changeset: &mut Changeset) {
        let tokens = self.stream.tokens();
        if index == 0 {
            return;
        }
        let prev = &tokens[index - 1];
        if prev.kind == TokenKind::Whitespace && !prev.is_newline() && prev.line == tokens[index].line {
            changeset.replace(index - 1, "");
        }
    }

    /// Insert a scaffold doc-block above the hook call at `site`, or above
    /// the annotations directly on top of it.
    pub fn missing_comment(&self, site: usize, ctx: &CommentContext) -> Option<Changeset> {
        let tokens = self.stream.tokens();
        let target = ctx.annotation_start.unwrap_or(site);
        let eol = self.stream.eol();
        let block = self.block(site, &self.config.summary_placeholder);
        let line_start = self.stream.line_start(target);
        let mut changeset = Changeset::default();

        let inline_open = tokens[line_start..target].iter().any(|t| t.is_open_tag());
        if inline_open || (tokens[target].line == 1 && line_start != target) {
            // `<?php do_action( 'x' ); ?>`: break the line after the tag.
            self.blank_preceding_whitespace(target, &mut changeset);
            changeset.insert_before(target, format!("{eol}{block}{eol}{}", self.padding(site)));
        } else {
            changeset.insert_before(line_start, format!("{block}{eol}"));
        }
        Some(changeset)
    }

    /// Convert a non-doc comment into a doc-block. Returns `None` when the
    /// comment cannot be converted without guessing.
    pub fn wrong_style(
        &self,
        site: usize,
        dialect: CommentDialect,
        start: Option<usize>,
        end: usize,
    ) -> Option<Changeset> {
        match dialect {
            CommentDialect::DocBlock => None,
            CommentDialect::LineComment => Some(self.replace_with_block(site, end)),
            CommentDialect::BlockComment => {
                let start = start?;
                if start == end {
                    Some(self.replace_with_block(site, end))
                } else {
                    Some(self.promote_block(start, end))
                }
            }
        }
    }

    fn replace_with_block(&self, site: usize, comment: usize) -> Changeset {
        let tokens = self.stream.tokens();
        let summary = summary_sentence(
            comment_text(&tokens[comment].content),
            &self.config.summary_placeholder,
        );
        let block = self.block(site, &summary);
        let mut changeset = Changeset::default();

        if self.stream.first_on_line(comment) {
            for index in self.stream.line_start(comment)..comment {
                changeset.replace(index, "");
            }
            changeset.replace(comment, block);
        } else {
            // Trailing comment after code: move it to its own lines.
            self.blank_preceding_whitespace(comment, &mut changeset);
            changeset.replace(comment, format!("{}{}", self.stream.eol(), block));
        }
        changeset
    }

    /// Rewrite the `/*` opener of a multi-line block comment to `/**`, and
    /// add the version tag line when the close marker sits alone.
    fn promote_block(&self, start: usize, end: usize) -> Changeset {
        let tokens = self.stream.tokens();
        let tag = &self.config.version_tag;
        let mut changeset = Changeset::default();
        changeset.replace(start, tokens[start].content.replacen("/*", "/**", 1));

        let mentions_tag = tokens[start..=end].iter().any(|t| t.content.contains(tag.as_str()));
        let close_alone = tokens[end].content.trim() == "*/" && self.stream.first_on_line(end);
        if !mentions_tag && close_alone {
            changeset.insert_before(
                self.stream.line_start(end),
                format!("{}* {}{}", self.stream.line_indent(end), tag, self.stream.eol()),
            );
        }
        changeset
    }

    /// Add the version tag line just above the close marker of a doc-block.
    pub fn missing_version_tag(&self, open: usize, close: usize) -> Option<Changeset> {
        let tokens = self.stream.tokens();
        if tokens[open].line == tokens[close].line || !self.stream.first_on_line(close) {
            return None;
        }
        let mut changeset = Changeset::default();
        changeset.insert_before(
            self.stream.line_start(close),
            format!(
                "{}* {}{}",
                self.stream.line_indent(close),
                self.config.version_tag,
                self.stream.eol()
            ),
        );
        Some(changeset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tokenize;
    use crate::rule::classify::{classify, Classification};
    use crate::rule::resolver::resolve;
    use crate::tokens::TokenList;

    fn site(list: &TokenList) -> usize {
        list.find_next(&[TokenKind::CallIdentifier], 0, None, false)
            .unwrap()
    }

    fn apply(list: &TokenList, changeset: &Changeset) -> String {
        let mut out = String::new();
        for token in list.tokens() {
            let edits: Vec<_> = changeset.edits.iter().filter(|e| e.anchor == token.index).collect();
            for e in edits.iter().filter(|e| e.mode == EditMode::InsertBefore) {
                out.push_str(&e.text);
            }
            match edits.iter().find(|e| e.mode == EditMode::Replace) {
                Some(e) => out.push_str(&e.text),
                None => out.push_str(&token.content),
            }
            for e in edits.iter().filter(|e| e.mode == EditMode::InsertAfter) {
                out.push_str(&e.text);
            }
        }
        out
    }

    fn fix_once(source: &str) -> Option<String> {
        let list = tokenize(source).unwrap().tokens;
        let config = Config::default();
        let builder = ChangesetBuilder::new(&list, &config);
        let site = site(&list);
        let ctx = resolve(&list, site);
        let changeset = match classify(&ctx) {
            Classification::Absent => builder.missing_comment(site, &ctx),
            Classification::WrongStyle { dialect, start, end } => {
                builder.wrong_style(site, dialect, start, end)
            }
            Classification::DocBlock { open, close } => builder.missing_version_tag(open, close),
        }?;
        Some(apply(&list, &changeset))
    }

    #[test]
    fn test_collapse_indent() {
        assert_eq!(collapse_indent("", 4, "\t"), "");
        assert_eq!(collapse_indent("\t\t", 4, "\t"), "\t\t");
        assert_eq!(collapse_indent("        ", 4, "\t"), "\t\t");
        assert_eq!(collapse_indent("      ", 4, "\t"), "\t  ");
        assert_eq!(collapse_indent("\t  ", 4, "    "), "      ");
    }

    #[test]
    fn test_summary_sentence() {
        assert_eq!(summary_sentence("does x", "Hook"), "Does x.");
        assert_eq!(summary_sentence("Already done.", "Hook"), "Already done.");
        assert_eq!(summary_sentence("why?", "Hook"), "Why?");
        assert_eq!(summary_sentence("   ", "Hook"), "Hook");
        assert_eq!(summary_sentence("ends */ early", "Hook"), "Ends * / early.");
    }

    #[test]
    fn test_comment_text() {
        assert_eq!(comment_text("// does x"), "does x");
        assert_eq!(comment_text("# shell style"), "shell style");
        assert_eq!(comment_text("/* block */"), "block");
        assert_eq!(comment_text("/***/"), "");
    }

    #[test]
    fn test_missing_comment_at_top_level() {
        assert_eq!(
            fix_once("<?php\ndo_action( 'x' );\n").unwrap(),
            "<?php\n/**\n * Hook\n *\n * @since\n */\ndo_action( 'x' );\n"
        );
    }

    #[test]
    fn test_missing_comment_keeps_indentation() {
        assert_eq!(
            fix_once("<?php\nif ( $a ) {\n\t\t$v = apply_filters( 'v', 1 );\n}\n").unwrap(),
            "<?php\nif ( $a ) {\n\t\t/**\n\t\t * Hook\n\t\t *\n\t\t * @since\n\t\t */\n\t\t$v = apply_filters( 'v', 1 );\n}\n"
        );
    }

    #[test]
    fn test_missing_comment_after_inline_open_tag() {
        assert_eq!(
            fix_once("<p>\n\t<?php do_action( 'x' ); ?>\n</p>\n").unwrap(),
            "<p>\n\t<?php\n\t/**\n\t * Hook\n\t *\n\t * @since\n\t */\n\tdo_action( 'x' ); ?>\n</p>\n"
        );
    }

    #[test]
    fn test_missing_comment_goes_above_translator_note() {
        assert_eq!(
            fix_once("<?php\n\t/* translators: %s: name */\n\t$m = apply_filters( 'm', 'x' );\n").unwrap(),
            "<?php\n\t/**\n\t * Hook\n\t *\n\t * @since\n\t */\n\t/* translators: %s: name */\n\t$m = apply_filters( 'm', 'x' );\n"
        );
    }

    #[test]
    fn test_line_comment_becomes_doc_block() {
        assert_eq!(
            fix_once("<?php\n\t// does x\n\tdo_action( 'x' );\n").unwrap(),
            "<?php\n\t/**\n\t * Does x.\n\t *\n\t * @since\n\t */\n\tdo_action( 'x' );\n"
        );
    }

    #[test]
    fn test_single_line_block_comment_becomes_doc_block() {
        assert_eq!(
            fix_once("<?php\n/* Fires late. */\ndo_action( 'x' );\n").unwrap(),
            "<?php\n/**\n * Fires late.\n *\n * @since\n */\ndo_action( 'x' );\n"
        );
    }

    #[test]
    fn test_multiline_block_comment_is_promoted() {
        assert_eq!(
            fix_once("<?php\n/*\n * Fires late.\n */\ndo_action( 'x' );\n").unwrap(),
            "<?php\n/**\n * Fires late.\n * @since\n */\ndo_action( 'x' );\n"
        );
    }

    #[test]
    fn test_multiline_block_with_tag_is_only_promoted() {
        assert_eq!(
            fix_once("<?php\n/* Fires late.\n * @since 1.0\n */\ndo_action( 'x' );\n").unwrap(),
            "<?php\n/** Fires late.\n * @since 1.0\n */\ndo_action( 'x' );\n"
        );
    }

    #[test]
    fn test_missing_version_tag_is_inserted() {
        assert_eq!(
            fix_once("<?php\n\t/**\n\t * Fires.\n\t */\n\tdo_action( 'x' );\n").unwrap(),
            "<?php\n\t/**\n\t * Fires.\n\t * @since\n\t */\n\tdo_action( 'x' );\n"
        );
    }

    #[test]
    fn test_single_line_doc_block_is_not_fixable() {
        assert_eq!(fix_once("<?php\n/** Fires. */\ndo_action( 'x' );\n"), None);
    }

    #[test]
    fn test_crlf_is_preserved() {
        assert_eq!(
            fix_once("<?php\r\ndo_action( 'x' );\r\n").unwrap(),
            "<?php\r\n/**\r\n * Hook\r\n *\r\n * @since\r\n */\r\ndo_action( 'x' );\r\n"
        );
    }
}
