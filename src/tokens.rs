//! Token model consumed by the hook documentation rule.
//!
//! A token stream is an ordered, immutable sequence of [`Token`]s whose
//! contents concatenate back to the original source. Hosts either build one
//! through [`crate::parser::tokenize`] or supply their own (tokens are serde
//! types, so a JSON dump from another tokenizer works too).

use serde::{Deserialize, Serialize};

/// Closed set of token kinds the rule distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Function name of a call expression (`do_action` in `do_action( 'x' )`).
    CallIdentifier,
    /// `// ...` or `# ...`
    LineComment,
    /// One line of a `/* ... */` comment.
    BlockComment,
    /// `/**`
    DocCommentOpen,
    /// `@since`, `@param`, ...
    DocCommentTag,
    /// `*/` closing a doc-block.
    DocCommentClose,
    Whitespace,
    Other,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::CallIdentifier => "call_identifier",
            TokenKind::LineComment => "line_comment",
            TokenKind::BlockComment => "block_comment",
            TokenKind::DocCommentOpen => "doc_comment_open",
            TokenKind::DocCommentTag => "doc_comment_tag",
            TokenKind::DocCommentClose => "doc_comment_close",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Other => "other",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Position in the stream.
    #[serde(default)]
    pub index: usize,
    pub kind: TokenKind,
    pub content: String,
    /// Line number (1-indexed)
    pub line: usize,
}

impl Token {
    /// True for a whitespace token that ends a line.
    pub fn is_newline(&self) -> bool {
        self.kind == TokenKind::Whitespace && self.content.ends_with('\n')
    }

    /// True for a PHP open tag (`<?php`, `<?=`, `<?`).
    pub fn is_open_tag(&self) -> bool {
        self.kind == TokenKind::Other && self.content.trim_start().starts_with("<?")
    }

    /// True for a PHP close tag.
    pub fn is_close_tag(&self) -> bool {
        self.kind == TokenKind::Other && self.content.trim() == "?>"
    }
}

/// Host-side view of a token stream.
///
/// The search helpers mirror the classic sniff API: `find_previous` walks
/// backward from `from` (inclusive), `find_next` walks forward from `from`
/// (inclusive) up to `to` (exclusive). With `exclude` set, `find_next`
/// returns the first token whose kind is *not* in `kinds`.
pub trait TokenStream {
    fn tokens(&self) -> &[Token];

    /// End-of-line sequence used when synthesizing text.
    fn eol(&self) -> &str;

    fn find_previous(&self, kinds: &[TokenKind], from: usize) -> Option<usize> {
        let tokens = self.tokens();
        if tokens.is_empty() {
            return None;
        }
        let mut cursor = from.min(tokens.len() - 1);
        loop {
            if kinds.contains(&tokens[cursor].kind) {
                return Some(cursor);
            }
            if cursor == 0 {
                return None;
            }
            cursor -= 1;
        }
    }

    fn find_next(
        &self,
        kinds: &[TokenKind],
        from: usize,
        to: Option<usize>,
        exclude: bool,
    ) -> Option<usize> {
        let tokens = self.tokens();
        let end = to.unwrap_or(tokens.len()).min(tokens.len());
        (from..end).find(|&i| kinds.contains(&tokens[i].kind) != exclude)
    }

    /// Index of the first token on the line holding `index`.
    fn line_start(&self, index: usize) -> usize {
        let tokens = self.tokens();
        let line = tokens[index].line;
        let mut cursor = index;
        while cursor > 0 && tokens[cursor - 1].line == line {
            cursor -= 1;
        }
        cursor
    }

    /// Leading whitespace of the line holding `index` ("" when none).
    fn line_indent(&self, index: usize) -> &str {
        let start = self.line_start(index);
        let token = &self.tokens()[start];
        if token.kind == TokenKind::Whitespace && !token.is_newline() && start != index {
            &token.content
        } else {
            ""
        }
    }

    /// Whether only whitespace precedes `index` on its line.
    fn first_on_line(&self, index: usize) -> bool {
        let start = self.line_start(index);
        self.tokens()[start..index]
            .iter()
            .all(|t| t.kind == TokenKind::Whitespace)
    }
}

/// Owned token stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenList {
    tokens: Vec<Token>,
    eol: String,
}

impl TokenList {
    /// Build a stream, renumbering token indices to match their position.
    pub fn new(mut tokens: Vec<Token>, eol: impl Into<String>) -> Self {
        for (i, token) in tokens.iter_mut().enumerate() {
            token.index = i;
        }
        Self {
            tokens,
            eol: eol.into(),
        }
    }

    /// Parse a JSON token dump (`{"tokens": [...], "eol": "\n"}`).
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let list: TokenList = serde_json::from_str(json)?;
        let eol = if list.eol.is_empty() {
            "\n".to_string()
        } else {
            list.eol
        };
        Ok(Self::new(list.tokens, eol))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Reassemble the source text.
    pub fn source(&self) -> String {
        self.tokens.iter().map(|t| t.content.as_str()).collect()
    }
}

impl TokenStream for TokenList {
    fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    fn eol(&self) -> &str {
        &self.eol
    }
}
