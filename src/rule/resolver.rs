//! Preceding comment resolution.
//!
//! Walks backward from a hook call to the nearest comment and decides
//! whether that comment sits directly above the call. All scans are
//! index-based over the immutable token slice; `cursor` is local to the
//! walk and never aliases the call site.

use crate::tokens::{TokenKind, TokenStream};

use super::classify::is_annotation;

/// Token kinds that end a comment.
pub const COMMENT_END_KINDS: &[TokenKind] = &[
    TokenKind::LineComment,
    TokenKind::BlockComment,
    TokenKind::DocCommentClose,
];

/// Position of a comment relative to the call it may document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjacency {
    /// No comment precedes the call.
    None,
    /// The comment ends on the line directly above, with only whitespace between.
    SameBlockAdjacentLine,
    /// The comment is further up or separated by code; it documents something else.
    NonAdjacent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentDialect {
    LineComment,
    BlockComment,
    DocBlock,
}

impl CommentDialect {
    fn of(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::LineComment => Some(CommentDialect::LineComment),
            TokenKind::BlockComment => Some(CommentDialect::BlockComment),
            TokenKind::DocCommentClose => Some(CommentDialect::DocBlock),
            _ => None,
        }
    }
}

/// What precedes one hook call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentContext {
    /// Last token of the preceding comment.
    pub preceding_token_index: Option<usize>,
    /// First token of the preceding comment; `None` when its opener cannot be found.
    pub start_index: Option<usize>,
    pub adjacency: Adjacency,
    pub dialect: Option<CommentDialect>,
    /// First token of the translator/pragma comments skipped on the way up.
    pub annotation_start: Option<usize>,
}

impl CommentContext {
    fn absent(annotation_start: Option<usize>) -> Self {
        Self {
            preceding_token_index: None,
            start_index: None,
            adjacency: Adjacency::None,
            dialect: None,
            annotation_start,
        }
    }

    pub fn is_adjacent(&self) -> bool {
        self.adjacency == Adjacency::SameBlockAdjacentLine
    }
}

/// Resolve the comment context of the hook call at `site`.
pub fn resolve<S: TokenStream + ?Sized>(stream: &S, site: usize) -> CommentContext {
    let tokens = stream.tokens();
    let mut anchor = site;
    let mut anchor_line = tokens[site].line;
    let mut annotation_start = None;
    let mut cursor = site;

    loop {
        if cursor == 0 {
            return CommentContext::absent(annotation_start);
        }
        let Some(end) = stream.find_previous(COMMENT_END_KINDS, cursor - 1) else {
            return CommentContext::absent(annotation_start);
        };
        let start = comment_start(stream, end);

        // Comments on the anchor's own line (`$x = /* int */ apply_filters(`)
        // annotate an expression, not the statement.
        if tokens[end].line >= anchor_line {
            cursor = start.unwrap_or(end);
            continue;
        }

        let dialect = CommentDialect::of(tokens[end].kind);
        let adjacency = if tokens[end].line + 1 == anchor_line && !separated(stream, end, anchor) {
            Adjacency::SameBlockAdjacentLine
        } else {
            Adjacency::NonAdjacent
        };

        if adjacency == Adjacency::SameBlockAdjacentLine && dialect != Some(CommentDialect::DocBlock) {
            if let Some(first) = start.filter(|&s| is_annotation(&tokens[s].content)) {
                // `$a = 1; // phpcs:ignore` belongs to the statement it trails.
                if !stream.first_on_line(first) {
                    return CommentContext::absent(annotation_start);
                }
                annotation_start = Some(first);
                anchor = first;
                anchor_line = tokens[first].line;
                cursor = first;
                continue;
            }
        }

        return CommentContext {
            preceding_token_index: Some(end),
            start_index: start,
            adjacency,
            dialect,
            annotation_start,
        };
    }
}

/// Find the first token of the comment ending at `end`.
pub fn comment_start<S: TokenStream + ?Sized>(stream: &S, end: usize) -> Option<usize> {
    let tokens = stream.tokens();
    match tokens[end].kind {
        TokenKind::LineComment => Some(end),
        TokenKind::DocCommentClose => stream.find_previous(&[TokenKind::DocCommentOpen], end),
        TokenKind::BlockComment => {
            // Lines of one comment are consecutive block-comment tokens; a
            // line ending in `*/` closes an earlier comment. Inner lines may
            // themselves start with `/*`.
            let mut opener = end;
            let mut cursor = end;
            while cursor > 0 {
                cursor -= 1;
                let token = &tokens[cursor];
                match token.kind {
                    TokenKind::Whitespace => {}
                    TokenKind::BlockComment if !token.content.trim_end().ends_with("*/") => opener = cursor,
                    _ => break,
                }
            }
            Some(opener).filter(|&i| tokens[i].content.starts_with("/*"))
        }
        _ => None,
    }
}

/// Whether code or a language boundary sits between the comment ending at
/// `end` and the `anchor` token on an earlier line than the anchor.
fn separated<S: TokenStream + ?Sized>(stream: &S, end: usize, anchor: usize) -> bool {
    let tokens = stream.tokens();
    let anchor_line = tokens[anchor].line;
    let mut cursor = end + 1;
    while let Some(i) = stream.find_next(&[TokenKind::Whitespace], cursor, Some(anchor), true) {
        let token = &tokens[i];
        if token.line < anchor_line || token.is_open_tag() || token.is_close_tag() {
            return true;
        }
        cursor = i + 1;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tokenize;
    use crate::tokens::TokenList;

    fn site(list: &TokenList) -> usize {
        list.find_next(&[TokenKind::CallIdentifier], 0, None, false)
            .expect("fixture has a call")
    }

    fn resolve_source(source: &str) -> (TokenList, CommentContext) {
        let list = tokenize(source).unwrap().tokens;
        let ctx = resolve(&list, site(&list));
        (list, ctx)
    }

    #[test]
    fn test_no_comment() {
        let (_, ctx) = resolve_source("<?php\n$a = 1;\ndo_action( 'x' );\n");
        assert_eq!(ctx.adjacency, Adjacency::None);
        assert_eq!(ctx.dialect, None);
    }

    #[test]
    fn test_adjacent_doc_block() {
        let (list, ctx) = resolve_source("<?php\n/**\n * Fires.\n */\ndo_action( 'x' );\n");
        assert!(ctx.is_adjacent());
        assert_eq!(ctx.dialect, Some(CommentDialect::DocBlock));
        let open = ctx.start_index.unwrap();
        assert_eq!(list.tokens()[open].kind, TokenKind::DocCommentOpen);
    }

    #[test]
    fn test_blank_line_breaks_adjacency() {
        let (_, ctx) = resolve_source("<?php\n// Fires.\n\ndo_action( 'x' );\n");
        assert_eq!(ctx.adjacency, Adjacency::NonAdjacent);
        assert_eq!(ctx.dialect, Some(CommentDialect::LineComment));
    }

    #[test]
    fn test_code_between_breaks_adjacency() {
        let (_, ctx) = resolve_source("<?php\n/* Note. */ $a = 1;\ndo_action( 'x' );\n");
        assert_eq!(ctx.adjacency, Adjacency::NonAdjacent);
    }

    #[test]
    fn test_code_before_call_on_its_line_keeps_adjacency() {
        let (_, ctx) = resolve_source("<?php\n// Filters the value.\n$v = apply_filters( 'v', 1 );\n");
        assert!(ctx.is_adjacent());
        assert_eq!(ctx.dialect, Some(CommentDialect::LineComment));
    }

    #[test]
    fn test_inline_comment_on_call_line_is_skipped() {
        let (_, ctx) = resolve_source(
            "<?php\n/**\n * Doc.\n */\n$v = (int) /* cast */ apply_filters( 'v', 1 );\n",
        );
        assert!(ctx.is_adjacent());
        assert_eq!(ctx.dialect, Some(CommentDialect::DocBlock));
    }

    #[test]
    fn test_multiline_block_comment_start() {
        let (list, ctx) = resolve_source("<?php\n/*\n * Fires.\n */\ndo_action( 'x' );\n");
        assert!(ctx.is_adjacent());
        assert_eq!(ctx.dialect, Some(CommentDialect::BlockComment));
        let start = ctx.start_index.unwrap();
        assert_eq!(list.tokens()[start].content, "/*");
        assert_eq!(list.tokens()[start].line, 2);
    }

    #[test]
    fn test_nested_opener_inside_block_comment() {
        let (list, ctx) = resolve_source("<?php\n/*\n/* old code\n */\ndo_action( 'x' );\n");
        assert_eq!(ctx.dialect, Some(CommentDialect::BlockComment));
        let start = ctx.start_index.unwrap();
        assert_eq!(list.tokens()[start].content, "/*");
        assert_eq!(list.tokens()[start].line, 2);
    }

    #[test]
    fn test_consecutive_block_comments_keep_their_own_opener() {
        let (list, ctx) = resolve_source("<?php\n/* one */\n/* two\n */\ndo_action( 'x' );\n");
        let start = ctx.start_index.unwrap();
        assert_eq!(list.tokens()[start].content, "/* two");
        assert_eq!(list.tokens()[start].line, 3);
    }

    #[test]
    fn test_pragma_trailing_code_is_not_transparent() {
        let (_, ctx) = resolve_source(
            "<?php\n/**\n * Fires.\n *\n * @since 1.0\n */\n$a = 1; // phpcs:ignore Foo\ndo_action( 'x' );\n",
        );
        assert_eq!(ctx.adjacency, Adjacency::None);
        assert_eq!(ctx.annotation_start, None);
    }

    #[test]
    fn test_pragma_is_transparent() {
        let (list, ctx) = resolve_source(
            "<?php\n/**\n * Fires.\n *\n * @since 1.0\n */\n// phpcs:ignore WordPress.NamingConventions\ndo_action( 'x' );\n",
        );
        assert!(ctx.is_adjacent());
        assert_eq!(ctx.dialect, Some(CommentDialect::DocBlock));
        let annotation = ctx.annotation_start.unwrap();
        assert_eq!(list.tokens()[annotation].line, 7);
    }

    #[test]
    fn test_translator_comment_without_doc_is_absent() {
        let (_, ctx) = resolve_source(
            "<?php\n$a = 1;\n/* translators: %s: name */\n$msg = apply_filters( 'msg', __( 'Hi %s', 'd' ) );\n",
        );
        assert_eq!(ctx.adjacency, Adjacency::None);
        assert!(ctx.annotation_start.is_some());
    }
}
