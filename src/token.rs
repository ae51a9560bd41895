//! Token model - the canonical, language-agnostic token representation
//!
//! Every frontend maps its grammar constructs into one closed set of token
//! types. Two universal sentinels exist alongside the semantic categories:
//! - `FileEnd`: delimits per-file sections of the stream
//! - `NoValue`: a token slot that carries no semantic value
//!
//! Position fields use `Option<u32>` as the explicit no-value marker: sentinel
//! tokens never carry positions, semantic tokens always do.

use serde::{Deserialize, Serialize};

/// Semantic categories for general-purpose programming languages.
///
/// Block-like constructs come in begin/end pairs so that nesting survives
/// in the flat stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTokenType {
    Import,
    ClassBegin,
    ClassEnd,
    FunctionBegin,
    FunctionEnd,
    If,
    Else,
    Loop,
    Break,
    Continue,
    Return,
    Throw,
    TryBegin,
    Catch,
    Finally,
    Assign,
    Call,
    Lambda,
}

/// Semantic categories for structured model files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTokenType {
    ElementBegin,
    ElementEnd,
    Attribute,
    Reference,
    /// Element whose type is not resolvable against the active schema
    /// (unknown type, or no schema loaded at all).
    UnresolvedElement,
}

/// The closed set of canonical token types shared by all frontends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Sentinel appended after every file, parsed or not.
    FileEnd,
    /// Sentinel for a slot that carries no semantic value.
    NoValue,
    /// A programming-language construct.
    Source(SourceTokenType),
    /// A structured-model construct.
    Model(ModelTokenType),
}

impl TokenType {
    /// Whether this type is one of the universal sentinels.
    pub fn is_sentinel(&self) -> bool {
        matches!(self, TokenType::FileEnd | TokenType::NoValue)
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenType::FileEnd => write!(f, "file_end"),
            TokenType::NoValue => write!(f, "no_value"),
            TokenType::Source(t) => write!(f, "{:?}", t),
            TokenType::Model(t) => write!(f, "{:?}", t),
        }
    }
}

/// A canonical, position-tagged token.
///
/// Immutable once constructed. Sentinel tokens carry `None` for all position
/// fields; semantic tokens carry concrete 1-indexed line/column and a byte
/// length. The constructors enforce this, so the invariant cannot be broken
/// from outside the module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The canonical token type
    pub token_type: TokenType,
    /// Identifier of the originating file (relative path)
    pub file: String,
    /// 1-indexed line, `None` for sentinels
    pub line: Option<u32>,
    /// 1-indexed column, `None` for sentinels
    pub column: Option<u32>,
    /// Length in bytes of the covered region, `None` for sentinels
    pub length: Option<u32>,
}

impl Token {
    /// Create a semantic token with concrete position data.
    pub fn new(
        token_type: TokenType,
        file: impl Into<String>,
        line: u32,
        column: u32,
        length: u32,
    ) -> Self {
        Self {
            token_type,
            file: file.into(),
            line: Some(line),
            column: Some(column),
            length: Some(length),
        }
    }

    /// Create the `FileEnd` sentinel for a file. Carries no position data.
    pub fn file_end(file: impl Into<String>) -> Self {
        Self {
            token_type: TokenType::FileEnd,
            file: file.into(),
            line: None,
            column: None,
            length: None,
        }
    }

    /// Whether this token is a sentinel.
    pub fn is_sentinel(&self) -> bool {
        self.token_type.is_sentinel()
    }
}
