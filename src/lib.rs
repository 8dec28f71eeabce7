//! hookdoc - documentation checks for PHP hook calls.
//!
//! WordPress-style plugins expose extension points by calling hook
//! functions such as `do_action( 'name' )` and `apply_filters( 'name', $v )`.
//! hookdoc requires each such call to be preceded by a `/** */` doc-block
//! carrying a `@since` tag, and can rewrite files to add or repair them.
//!
//! # Architecture
//!
//! - `parser`: tree-sitter-php tokenizer producing a flat [`TokenList`]
//! - `tokens`: token model and the [`TokenStream`] navigation trait
//! - `rule`: hook scanning, comment resolution, findings, changesets
//! - `fixer`: applies changesets atomically and renders the fixed source
//! - `config`: YAML config schema
//! - `report`: output formatting (pretty, JSON)
//!
//! The rule only depends on [`TokenStream`], so any producer of tokens in
//! the documented shape can drive it.

pub mod cli;
pub mod config;
pub mod fixer;
pub mod parser;
pub mod report;
pub mod rule;
pub mod tokens;

pub use config::{Config, StrictMode};
pub use fixer::{FixError, Fixer};
pub use parser::{tokenize, ParsedSource, PhpTokenizer, Tokenizer};
pub use rule::{CommentHooksRule, FileReport, Finding, FindingCode, RunResult, Runner, Severity};
pub use tokens::{Token, TokenKind, TokenList, TokenStream};
