//! Core frontend framework
//!
//! Defines the trait all frontends implement, the token sink they emit into,
//! and the batch driver that turns a directory plus an ordered file list into
//! one [`TokenBatch`].
//!
//! Error isolation: a file that cannot be opened or parsed costs exactly one
//! error and its `FileEnd` sentinel; the batch always runs to completion.
//! Only an invalid directory or an empty file list abort up front.

use crate::batch::{Diagnostic, Severity, TokenBatch};
use crate::token::{Token, TokenType};
use crate::{Error, Result};
use std::ops::Range;
use std::path::Path;

/// Accumulator for the tokens and diagnostics of one file.
///
/// The tree walker calls [`emit`](TokenSink::emit) for every recognized
/// construct; the driver owns the sink and folds it into the batch.
#[derive(Debug)]
pub struct TokenSink {
    file: String,
    tokens: Vec<Token>,
    diagnostics: Vec<Diagnostic>,
}

impl TokenSink {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            tokens: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// The file currently being parsed.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Emit one semantic token at a concrete source position.
    pub fn emit(&mut self, token_type: TokenType, line: u32, column: u32, length: u32) {
        self.tokens
            .push(Token::new(token_type, self.file.clone(), line, column, length));
    }

    /// Record a non-fatal warning for the current file.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("'{}': {}", self.file, message);
        self.diagnostics
            .push(Diagnostic::warning(self.file.clone(), message));
    }

    pub fn into_parts(self) -> (Vec<Token>, Vec<Diagnostic>) {
        (self.tokens, self.diagnostics)
    }
}

/// Trait for language frontends.
///
/// A frontend is responsible for:
/// 1. Identifying files it can parse (by extension)
/// 2. Driving its grammar pipeline over one file's source
/// 3. Walking the resulting parse structure and emitting canonical tokens
pub trait Frontend {
    /// Get the language name (for display and selection)
    fn language_name(&self) -> &str;

    /// Get file extensions this frontend handles
    fn file_extensions(&self) -> &[&str];

    /// Check if this frontend can handle a file
    fn can_handle(&self, path: &Path) -> bool {
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            self.file_extensions().contains(&ext)
        } else {
            false
        }
    }

    /// Parse one file's source and emit its tokens into the sink.
    ///
    /// An `Err` marks the whole file as failed; any tokens already emitted
    /// for it are discarded by the driver.
    fn parse_file(&mut self, file_name: &str, source: &str, sink: &mut TokenSink) -> Result<()>;

    /// Earlier files the frontend wants re-parsed because its state changed
    /// (a schema load, see [`super::model`]). Drained by the driver after
    /// every file.
    fn take_reprocess_requests(&mut self) -> Vec<String> {
        Vec::new()
    }
}

/// Parse an ordered batch of files under one directory into a [`TokenBatch`].
///
/// Files are processed strictly in list order, single-threaded. Each file
/// contributes its semantic tokens (on success) followed unconditionally by
/// a `FileEnd` sentinel, so the sentinel count always equals the input file
/// count and their relative order mirrors the input.
pub fn parse(
    frontend: &mut dyn Frontend,
    directory: &Path,
    file_names: &[String],
) -> Result<TokenBatch> {
    if file_names.is_empty() {
        return Err(Error::InvalidBatch("file list is empty".to_string()));
    }
    if !directory.is_dir() {
        return Err(Error::InvalidBatch(format!(
            "'{}' is not a readable directory",
            directory.display()
        )));
    }

    let mut tokens: Vec<Token> = Vec::new();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    // semantic-token span per file, sentinel excluded; used for reprocessing
    let mut spans: Vec<(String, Range<usize>)> = Vec::new();
    let mut errors = 0;

    for file_name in file_names {
        let start = tokens.len();
        match run_file(frontend, directory, file_name) {
            Ok((file_tokens, file_diags)) => {
                tokens.extend(file_tokens);
                diagnostics.extend(file_diags);
            }
            Err(err) => {
                tracing::error!("parsing error in '{}': {}", file_name, err);
                diagnostics.push(Diagnostic::error(file_name.clone(), err.to_string()));
                errors += 1;
            }
        }
        spans.push((file_name.clone(), start..tokens.len()));
        tokens.push(Token::file_end(file_name.clone()));

        for stale in frontend.take_reprocess_requests() {
            reprocess_file(
                frontend,
                directory,
                &stale,
                &mut tokens,
                &mut spans,
                &mut diagnostics,
            );
        }
    }

    Ok(TokenBatch {
        tokens,
        errors,
        diagnostics,
    })
}

/// Run the frontend over a single file. The file handle is scoped to this
/// call and released before the next file starts.
fn run_file(
    frontend: &mut dyn Frontend,
    directory: &Path,
    file_name: &str,
) -> Result<(Vec<Token>, Vec<Diagnostic>)> {
    let path = directory.join(file_name);
    let source = std::fs::read_to_string(&path)?;
    let mut sink = TokenSink::new(file_name);
    frontend.parse_file(file_name, &source, &mut sink)?;
    Ok(sink.into_parts())
}

/// Re-parse one earlier file and splice its tokens in place.
///
/// Sentinels and file order are untouched; stale warnings for the file are
/// dropped. A reprocessing failure keeps the old tokens rather than
/// degrading the batch.
fn reprocess_file(
    frontend: &mut dyn Frontend,
    directory: &Path,
    file_name: &str,
    tokens: &mut Vec<Token>,
    spans: &mut [(String, Range<usize>)],
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some(idx) = spans.iter().rposition(|(f, _)| f == file_name) else {
        return;
    };
    match run_file(frontend, directory, file_name) {
        Ok((new_tokens, new_diags)) => {
            diagnostics.retain(|d| !(d.file == file_name && d.severity == Severity::Warning));
            let range = spans[idx].1.clone();
            let delta = new_tokens.len() as isize - range.len() as isize;
            let new_end = range.start + new_tokens.len();
            tokens.splice(range.clone(), new_tokens);
            spans[idx].1 = range.start..new_end;
            for (_, r) in spans.iter_mut().skip(idx + 1) {
                *r = shift(r.start, delta)..shift(r.end, delta);
            }
            diagnostics.extend(new_diags);
            tracing::debug!("reprocessed '{}' against freshly loaded schema", file_name);
        }
        Err(err) => {
            tracing::warn!("could not reprocess '{}': {}", file_name, err);
        }
    }
}

fn shift(index: usize, delta: isize) -> usize {
    (index as isize + delta) as usize
}

/// Registry of language frontends
#[derive(Default)]
pub struct FrontendRegistry {
    frontends: Vec<Box<dyn Frontend>>,
}

impl FrontendRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a frontend
    pub fn register(&mut self, frontend: impl Frontend + 'static) {
        self.frontends.push(Box::new(frontend));
    }

    /// Find a frontend for a file
    pub fn find_frontend(&mut self, path: &Path) -> Option<&mut (dyn Frontend + 'static)> {
        self.frontends
            .iter_mut()
            .find(|f| f.can_handle(path))
            .map(|f| &mut **f)
    }

    /// Find a frontend by language name (case-insensitive)
    pub fn by_name(&mut self, name: &str) -> Option<&mut (dyn Frontend + 'static)> {
        self.frontends
            .iter_mut()
            .find(|f| f.language_name().eq_ignore_ascii_case(name))
            .map(|f| &mut **f)
    }

    /// Get all registered frontends
    pub fn frontends(&self) -> &[Box<dyn Frontend>] {
        &self.frontends
    }
}

/// Create a default registry with all built-in frontends
pub fn default_registry() -> FrontendRegistry {
    let mut registry = FrontendRegistry::new();
    registry.register(super::source::SourceFrontend::python());
    registry.register(super::source::SourceFrontend::javascript());
    registry.register(super::model::ModelFrontend::new());
    registry
}
