//! Version tag lookup inside a doc-block.

use crate::tokens::{Token, TokenKind, TokenStream};

/// The tag tokens of one doc-block, in source order.
#[derive(Debug)]
pub struct DocBlockTags<'a> {
    tags: Vec<&'a Token>,
}

impl<'a> DocBlockTags<'a> {
    /// Collect the tags between the `open` and `close` markers.
    pub fn collect<S: TokenStream + ?Sized>(stream: &'a S, open: usize, close: usize) -> Self {
        let tokens = stream.tokens();
        let end = close.min(tokens.len());
        let tags = tokens
            .get(open..end)
            .unwrap_or_default()
            .iter()
            .filter(|t| t.kind == TokenKind::DocCommentTag)
            .collect();
        Self { tags }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.content == tag)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.tags.iter().map(|t| t.content.as_str())
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Whether the doc-block carries `version_tag`, with or without a value.
pub fn has_version_tag<S: TokenStream + ?Sized>(
    stream: &S,
    open: usize,
    close: usize,
    version_tag: &str,
) -> bool {
    DocBlockTags::collect(stream, open, close).contains(version_tag)
}
