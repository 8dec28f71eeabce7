//! tree-sitter-php adapter.
//!
//! Walks the leaves of the concrete syntax tree and re-labels them into the
//! closed [`TokenKind`] set. Gaps between leaves (whitespace, which
//! tree-sitter does not materialise) are filled from the source so the
//! token contents always concatenate back to the input.

use tree_sitter::{Node, Parser as TsParser};

use super::{detect_eol, ParsedSource, TokenizeError, Tokenizer};
use crate::tokens::{Token, TokenKind, TokenList};

/// Node kinds emitted as a single unit even when they have children.
const ATOMIC_KINDS: &[&str] = &[
    "comment",
    "string",
    "encapsed_string",
    "heredoc",
    "nowdoc",
    "text",
];

/// PHP tokenizer backed by tree-sitter-php.
#[derive(Debug, Default, Clone, Copy)]
pub struct PhpTokenizer;

impl Tokenizer for PhpTokenizer {
    fn tokenize(&self, source: &str) -> Result<ParsedSource, TokenizeError> {
        let mut parser = TsParser::new();
        parser
            .set_language(&tree_sitter_php::LANGUAGE_PHP.into())
            .map_err(|e| TokenizeError::Language(e.to_string()))?;
        let tree = parser
            .parse(source, None)
            .ok_or(TokenizeError::NoTree)?;
        let root = tree.root_node();

        let mut builder = TokenBuilder::new(source);
        builder.walk(root);
        builder.fill_gap(source.len());

        Ok(ParsedSource {
            tokens: TokenList::new(builder.tokens, detect_eol(source)),
            has_errors: root.has_error(),
        })
    }

    fn language(&self) -> &str {
        "php"
    }
}

struct TokenBuilder<'s> {
    source: &'s str,
    tokens: Vec<Token>,
    /// Byte offset up to which the source has been emitted.
    pos: usize,
    line: usize,
}

impl<'s> TokenBuilder<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            pos: 0,
            line: 1,
        }
    }

    /// Depth-first leaf walk using a tree cursor (no recursion).
    fn walk(&mut self, root: Node) {
        let mut cursor = root.walk();
        loop {
            let node = cursor.node();
            let descend = node.child_count() > 0 && !ATOMIC_KINDS.contains(&node.kind());
            if descend && cursor.goto_first_child() {
                continue;
            }
            if !descend {
                self.leaf(node);
            }
            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return;
                }
            }
        }
    }

    fn leaf(&mut self, node: Node) {
        let start = node.start_byte().max(self.pos);
        let end = node.end_byte().min(self.source.len());
        if end <= start {
            // MISSING nodes and anything already emitted
            return;
        }
        self.fill_gap(start);

        let text = &self.source[start..end];
        match node.kind() {
            "comment" => self.comment(text),
            "name" if is_call_name(node) => self.push(TokenKind::CallIdentifier, text),
            _ => self.segment(text, TokenKind::Other),
        }
        self.pos = end;
    }

    fn fill_gap(&mut self, until: usize) {
        if until > self.pos {
            let gap = &self.source[self.pos..until];
            self.segment(gap, TokenKind::Other);
            self.pos = until;
        }
    }

    fn comment(&mut self, text: &str) {
        if text.starts_with("/**") && !text.starts_with("/**/") {
            self.doc_comment(text);
        } else if text.starts_with("/*") {
            self.segment(text, TokenKind::BlockComment);
        } else {
            self.segment(text, TokenKind::LineComment);
        }
    }

    fn doc_comment(&mut self, text: &str) {
        let pieces: Vec<&str> = text.split_inclusive('\n').collect();
        let last = pieces.len().saturating_sub(1);
        for (i, piece) in pieces.into_iter().enumerate() {
            let (body, newline) = split_newline(piece);
            self.doc_line(body, i == 0, i == last);
            self.push(TokenKind::Whitespace, newline);
        }
    }

    fn doc_line(&mut self, body: &str, first: bool, last: bool) {
        let mut rest = body;
        if first {
            self.push(TokenKind::DocCommentOpen, "/**");
            rest = &rest[3..];
        }
        let close = last && rest.ends_with("*/");
        if close {
            rest = &rest[..rest.len() - 2];
        }

        rest = self.take_whitespace(rest);
        if !first && rest.starts_with('*') {
            self.push(TokenKind::Other, "*");
            rest = self.take_whitespace(&rest[1..]);
        }
        if rest.starts_with('@') {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            self.push(TokenKind::DocCommentTag, &rest[..end]);
            rest = self.take_whitespace(&rest[end..]);
        }
        let content = rest.trim_end();
        self.push(TokenKind::Other, content);
        self.push(TokenKind::Whitespace, &rest[content.len()..]);

        if close {
            self.push(TokenKind::DocCommentClose, "*/");
        }
    }

    /// Split `text` into per-line tokens of `kind`, peeling off leading
    /// whitespace and line endings into whitespace tokens.
    fn segment(&mut self, text: &str, kind: TokenKind) {
        for piece in text.split_inclusive('\n') {
            let (body, newline) = split_newline(piece);
            let rest = self.take_whitespace(body);
            if rest.trim().is_empty() {
                self.push(TokenKind::Whitespace, rest);
            } else {
                self.push(kind, rest);
            }
            self.push(TokenKind::Whitespace, newline);
        }
    }

    fn take_whitespace<'t>(&mut self, text: &'t str) -> &'t str {
        let rest = text.trim_start_matches([' ', '\t']);
        self.push(TokenKind::Whitespace, &text[..text.len() - rest.len()]);
        rest
    }

    fn push(&mut self, kind: TokenKind, text: &str) {
        if text.is_empty() {
            return;
        }
        let newline = text.ends_with('\n');

        // Keep one whitespace token per run within a line.
        if kind == TokenKind::Whitespace && !newline {
            if let Some(last) = self.tokens.last_mut() {
                if last.kind == TokenKind::Whitespace && !last.is_newline() {
                    last.content.push_str(text);
                    return;
                }
            }
        }

        self.tokens.push(Token {
            index: self.tokens.len(),
            kind,
            content: text.to_string(),
            line: self.line,
        });
        if newline {
            self.line += 1;
        }
    }
}

fn split_newline(piece: &str) -> (&str, &str) {
    if let Some(body) = piece.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = piece.strip_suffix('\n') {
        (body, "\n")
    } else {
        (piece, "")
    }
}

/// Whether a `name` node is the callee of a function call expression.
fn is_call_name(node: Node) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    let callee = match parent.kind() {
        "function_call_expression" => Some((parent, node)),
        // Only the final segment of `A\B\name` is the callee.
        "qualified_name" if node.next_named_sibling().is_none() => parent
            .parent()
            .filter(|p| p.kind() == "function_call_expression")
            .map(|p| (p, parent)),
        _ => None,
    };
    callee
        .and_then(|(call, target)| {
            call.child_by_field_name("function")
                .map(|f| f.id() == target.id())
        })
        .unwrap_or(false)
}
