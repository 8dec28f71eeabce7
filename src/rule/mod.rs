//! The hook documentation rule.
//!
//! For each call to a configured hook function the rule finds the comment
//! directly above it, classifies its style, and reports one of three
//! findings:
//!
//! - `MissingHookComment`: nothing documents the call
//! - `HookCommentWrongStyle`: a `//`, `#` or `/* */` comment documents it
//! - `MissingSinceComment`: the doc-block has no version tag
//!
//! Translator notes and `phpcs:` pragmas between a doc-block and its call
//! are looked through. Fixes are built as [`changeset::Changeset`]s and
//! applied by the [`Fixer`](crate::fixer::Fixer).

pub mod changeset;
pub mod classify;
pub mod diagnostics;
pub mod resolver;
pub mod runner;
pub mod scanner;
pub mod sniff;
pub mod suppress;
pub mod types;
pub mod version;

pub use changeset::{Changeset, ChangesetBuilder, Edit, EditMode};
pub use classify::{classify, Classification};
pub use diagnostics::{diagnose, FileReport};
pub use resolver::{resolve, Adjacency, CommentContext, CommentDialect};
pub use runner::{FileResult, FixOutcome, RunResult, Runner, MAX_FIX_PASSES};
pub use scanner::{scan_hook_calls, HookCallSite};
pub use sniff::CommentHooksRule;
pub use suppress::{Suppression, SuppressionSet, SuppressionType};
pub use types::{Finding, FindingCode, Severity, SuppressedFinding};
