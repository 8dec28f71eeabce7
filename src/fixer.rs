//! Token-level fixer.
//!
//! Holds the rendered text of every token and applies changesets to it.
//! Edits are staged while a changeset is open and only reach the token
//! buffer when the changeset ends without conflicts; a conflicting
//! changeset is discarded whole.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, warn};

use crate::rule::changeset::{Changeset, Edit, EditMode};
use crate::tokens::TokenStream;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FixError {
    #[error("token {index} is out of range (stream has {len} tokens)")]
    TokenOutOfRange { index: usize, len: usize },

    #[error("no changeset is open")]
    NoChangeset,

    #[error("a changeset is already open")]
    ChangesetOpen,

    #[error("token {0} was already edited by another changeset")]
    Conflict(usize),

    #[error("fixed output introduces syntax errors")]
    InvalidOutput,
}

#[derive(Debug, Clone, Default)]
struct Slot {
    before: String,
    content: String,
    after: String,
}

#[derive(Debug, Clone)]
pub struct Fixer {
    slots: Vec<Slot>,
    staged: Option<Vec<Edit>>,
    touched: HashSet<usize>,
    committed: usize,
    discarded: usize,
}

impl Fixer {
    pub fn new<S: TokenStream + ?Sized>(stream: &S) -> Self {
        let slots = stream
            .tokens()
            .iter()
            .map(|t| Slot {
                content: t.content.clone(),
                ..Slot::default()
            })
            .collect();
        Self {
            slots,
            staged: None,
            touched: HashSet::new(),
            committed: 0,
            discarded: 0,
        }
    }

    pub fn begin_changeset(&mut self) -> Result<(), FixError> {
        if self.staged.is_some() {
            return Err(FixError::ChangesetOpen);
        }
        self.staged = Some(Vec::new());
        Ok(())
    }

    pub fn replace_token(&mut self, index: usize, text: impl Into<String>) -> Result<(), FixError> {
        self.stage(index, text.into(), EditMode::Replace)
    }

    /// Append text after the token.
    pub fn add_content(&mut self, index: usize, text: impl Into<String>) -> Result<(), FixError> {
        self.stage(index, text.into(), EditMode::InsertAfter)
    }

    pub fn add_content_before(&mut self, index: usize, text: impl Into<String>) -> Result<(), FixError> {
        self.stage(index, text.into(), EditMode::InsertBefore)
    }

    fn stage(&mut self, anchor: usize, text: String, mode: EditMode) -> Result<(), FixError> {
        let len = self.slots.len();
        let staged = self.staged.as_mut().ok_or(FixError::NoChangeset)?;
        if anchor >= len {
            return Err(FixError::TokenOutOfRange { index: anchor, len });
        }
        staged.push(Edit { anchor, text, mode });
        Ok(())
    }

    /// Commit the open changeset. On conflict nothing is applied and the
    /// changeset is dropped.
    pub fn end_changeset(&mut self) -> Result<(), FixError> {
        let edits = self.staged.take().ok_or(FixError::NoChangeset)?;

        let mut replaced = HashSet::new();
        for edit in &edits {
            if self.touched.contains(&edit.anchor)
                || (edit.mode == EditMode::Replace && !replaced.insert(edit.anchor))
            {
                self.discarded += 1;
                return Err(FixError::Conflict(edit.anchor));
            }
        }

        for edit in edits.iter().filter(|e| e.mode == EditMode::InsertBefore) {
            self.slots[edit.anchor].before.push_str(&edit.text);
        }
        for edit in edits {
            let slot = &mut self.slots[edit.anchor];
            match edit.mode {
                EditMode::InsertBefore => {}
                EditMode::Replace => slot.content = edit.text,
                EditMode::InsertAfter => slot.after.push_str(&edit.text),
            }
            self.touched.insert(edit.anchor);
        }
        self.committed += 1;
        Ok(())
    }

    pub fn rollback_changeset(&mut self) {
        if self.staged.take().is_some() {
            self.discarded += 1;
        }
    }

    /// Apply a whole changeset atomically.
    pub fn apply(&mut self, changeset: &Changeset) -> Result<(), FixError> {
        self.begin_changeset()?;
        for edit in &changeset.edits {
            let staged = match edit.mode {
                EditMode::InsertBefore => self.add_content_before(edit.anchor, edit.text.as_str()),
                EditMode::InsertAfter => self.add_content(edit.anchor, edit.text.as_str()),
                EditMode::Replace => self.replace_token(edit.anchor, edit.text.as_str()),
            };
            if let Err(e) = staged {
                self.rollback_changeset();
                return Err(e);
            }
        }
        match self.end_changeset() {
            Ok(()) => {
                debug!(edits = changeset.len(), "applied changeset");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "discarded changeset");
                Err(e)
            }
        }
    }

    /// Number of changesets committed.
    pub fn committed(&self) -> usize {
        self.committed
    }

    /// Number of changesets dropped by conflict or rollback.
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    pub fn is_changed(&self) -> bool {
        self.committed > 0
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for slot in &self.slots {
            out.push_str(&slot.before);
            out.push_str(&slot.content);
            out.push_str(&slot.after);
        }
        out
    }
}
