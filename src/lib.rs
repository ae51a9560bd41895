//! # Simtok - Canonical token-stream frontends
//!
//! Normalizes heterogeneous source artifacts - programming-language files and
//! structured model files - into one canonical, ordered stream of typed tokens
//! with source-position metadata.
//!
//! Simtok provides:
//! - A language-agnostic [`Token`] model with per-file `FileEnd` sentinels
//! - Tree-sitter based parsing with pluggable [`frontend::Frontend`]s
//! - Per-file error isolation: a failed file costs one error, never the batch
//! - A schema-aware model frontend where the first schema file in a batch
//!   governs the interpretation of subsequent instance files
//!
//! The resulting [`TokenBatch`] (token sequence + error count) is the sole
//! contract with a downstream similarity/comparison engine.

pub mod batch;
pub mod config;
pub mod frontend;
pub mod token;

// Re-exports for convenient access
pub use batch::{Diagnostic, Severity, TokenBatch};
pub use frontend::{Frontend, FrontendRegistry, parse};
pub use token::{ModelTokenType, SourceTokenType, Token, TokenType};

/// Result type alias for Simtok operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Simtok operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Grammar error: {0}")]
    Grammar(String),

    #[error("Schema load error: {0}")]
    SchemaLoad(String),

    #[error("Invalid batch: {0}")]
    InvalidBatch(String),
}
