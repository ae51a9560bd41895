//! Token batch - the result of one parse invocation
//!
//! A batch covers an ordered set of files processed as a unit. Its token
//! sequence is delimited by one `FileEnd` sentinel per input file, in input
//! order, and its error count records how many files failed. Diagnostics give
//! callers per-file visibility without affecting the contract.

use crate::token::{Token, TokenType};
use serde::{Deserialize, Serialize};

/// Severity of a per-file diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The file failed and was counted into the batch error count.
    Error,
    /// Observational only; never counted as an error.
    Warning,
}

/// A per-file diagnostic recorded while building a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub file: String,
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn error(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn warning(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

/// The finished result of parsing one batch of files.
///
/// Never mutated after being returned by the driver.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenBatch {
    /// All tokens in file-list order, sentinel-delimited
    pub tokens: Vec<Token>,
    /// Number of files that failed to open or parse
    pub errors: usize,
    /// Per-file diagnostics (errors and warnings) in occurrence order
    pub diagnostics: Vec<Diagnostic>,
}

impl TokenBatch {
    /// Count the `FileEnd` sentinels in the stream. Always equals the number
    /// of input files of the batch.
    pub fn file_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|t| t.token_type == TokenType::FileEnd)
            .count()
    }

    /// Tokens attributed to one file, sentinel included.
    pub fn tokens_for_file<'a>(&'a self, file: &'a str) -> impl Iterator<Item = &'a Token> {
        self.tokens.iter().filter(move |t| t.file == file)
    }

    /// Warnings recorded during the batch.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }
}
