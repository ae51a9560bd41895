//! Tree walker - turns a tree-sitter parse tree into canonical tokens
//!
//! The walker is generic over languages: a [`TokenMapping`] injected by the
//! frontend maps grammar node kinds to canonical token types, with an
//! optional exit token for block-like constructs. The walk itself is a plain
//! depth-first, left-to-right traversal in document order, so emission order
//! always equals source order. The walker holds no state across files.

use crate::frontend::framework::TokenSink;
use crate::token::TokenType;
use std::collections::HashMap;
use tree_sitter::Node;

/// Canonical tokens produced for one grammar construct.
#[derive(Debug, Clone, Copy)]
pub struct ConstructTokens {
    /// Emitted at the node's start position, before its children
    pub enter: TokenType,
    /// Emitted at the node's end position, after its children
    pub exit: Option<TokenType>,
}

/// Per-language mapping from grammar node kind to canonical token types.
///
/// Node kinds absent from the mapping emit nothing themselves; their
/// children are still visited.
#[derive(Debug, Default)]
pub struct TokenMapping {
    entries: HashMap<&'static str, ConstructTokens>,
}

impl TokenMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a node kind to a single token.
    pub fn map(mut self, kind: &'static str, enter: TokenType) -> Self {
        self.entries.insert(kind, ConstructTokens { enter, exit: None });
        self
    }

    /// Map a block-like node kind to an enter/exit token pair.
    pub fn map_pair(mut self, kind: &'static str, enter: TokenType, exit: TokenType) -> Self {
        self.entries.insert(
            kind,
            ConstructTokens {
                enter,
                exit: Some(exit),
            },
        );
        self
    }

    pub fn lookup(&self, kind: &str) -> Option<ConstructTokens> {
        self.entries.get(kind).copied()
    }
}

/// Depth-first emitter over a parse (sub)tree.
pub struct TreeWalker<'m> {
    mapping: &'m TokenMapping,
}

impl<'m> TreeWalker<'m> {
    pub fn new(mapping: &'m TokenMapping) -> Self {
        Self { mapping }
    }

    /// Walk one subtree in document order, emitting into the sink.
    ///
    /// Enter tokens carry the node's 1-indexed start position and byte
    /// length; exit tokens carry the position just past the node's end.
    /// Both are non-decreasing along the emission sequence.
    pub fn walk(&self, node: Node, sink: &mut TokenSink) {
        let mapped = self.mapping.lookup(node.kind());

        if let Some(construct) = mapped {
            let start = node.start_position();
            let length = (node.end_byte() - node.start_byte()) as u32;
            sink.emit(
                construct.enter,
                start.row as u32 + 1,
                start.column as u32 + 1,
                length,
            );
        }

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.walk(child, sink);
        }

        if let Some(exit) = mapped.and_then(|c| c.exit) {
            let end = node.end_position();
            sink.emit(exit, end.row as u32 + 1, end.column as u32 + 1, 1);
        }
    }
}
