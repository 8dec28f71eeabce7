//! Token sources for the hook documentation rule.
//!
//! This module provides:
//! - `Tokenizer` trait: abstract interface for producing a [`TokenList`]
//! - `PhpTokenizer`: tree-sitter-php backed implementation
//!
//! The rule itself only consumes the [`TokenStream`](crate::tokens::TokenStream)
//! trait; anything able to produce tokens of the documented shape can feed it.

mod php;

use thiserror::Error;

use crate::tokens::TokenList;

pub use php::PhpTokenizer;

/// Errors raised while producing a token stream.
#[derive(Debug, Error)]
pub enum TokenizeError {
    #[error("failed to load PHP grammar: {0}")]
    Language(String),
    #[error("parser produced no syntax tree")]
    NoTree,
}

/// Tokens of one source file plus parse health.
#[derive(Debug, Clone)]
pub struct ParsedSource {
    pub tokens: TokenList,
    /// Whether the external parser reported syntax errors.
    pub has_errors: bool,
}

/// Produces a token stream from source text.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, source: &str) -> Result<ParsedSource, TokenizeError>;

    /// Return the language this tokenizer handles (e.g., "php").
    fn language(&self) -> &str;
}

/// Tokenize PHP source with the default tokenizer.
pub fn tokenize(source: &str) -> Result<ParsedSource, TokenizeError> {
    PhpTokenizer.tokenize(source)
}

/// Detect the end-of-line sequence used by a source file.
pub fn detect_eol(source: &str) -> &'static str {
    if source.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}
