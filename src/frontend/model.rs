//! Schema-aware frontend for structured model files
//!
//! Model batches are two-phase: the first `.schema.json` file in a batch
//! defines the schema (an ordered set of named structural definitions), and
//! subsequent instance files are interpreted against it. The schema lives on
//! the frontend instance, never in process-wide state, so one batch can never
//! leak definitions into another.
//!
//! Instances parsed before any schema was loaded proceed with degraded
//! interpretation (every element unresolved) and surface one warning per
//! file. What happens to them once a schema does arrive is a configuration
//! choice, [`LateSchemaPolicy`].
//!
//! Model files carry no meaningful textual layout once deserialized, so token
//! positions are synthesized from document order: line is the running
//! emission index, column the nesting depth, length the construct name
//! length. This keeps the (line, column) ordering invariant intact.

use super::framework::{Frontend, TokenSink};
use crate::token::{ModelTokenType, TokenType};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// File-name suffix marking a schema-defining file.
pub const SCHEMA_SUFFIX: &str = ".schema.json";

/// One named structural definition of a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub references: Vec<String>,
}

/// An ordered collection of named structural definitions.
///
/// Replaced wholesale when a new schema file is parsed, never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub definitions: Vec<Definition>,
}

impl Schema {
    pub fn definition(&self, name: &str) -> Option<&Definition> {
        self.definitions.iter().find(|d| d.name == name)
    }
}

/// One element of a model instance document.
#[derive(Debug, Deserialize)]
struct ModelElement {
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    attributes: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    references: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    children: Vec<ModelElement>,
}

/// What to do with instance files that were parsed before the schema arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LateSchemaPolicy {
    /// Leave earlier instances permanently unresolved (the literal,
    /// order-dependent behavior).
    #[default]
    LeaveUnresolved,
    /// Ask the driver to re-parse earlier schema-less instances against the
    /// freshly loaded schema.
    ReprocessInstances,
}

/// Two-phase frontend for structured model files.
pub struct ModelFrontend {
    schema: Option<Schema>,
    policy: LateSchemaPolicy,
    /// Instance files parsed while no schema was loaded, in parse order
    unresolved_files: Vec<String>,
    /// Queued for the driver after a schema load under `ReprocessInstances`
    pending_reprocess: Vec<String>,
}

impl ModelFrontend {
    pub fn new() -> Self {
        Self::with_policy(LateSchemaPolicy::default())
    }

    pub fn with_policy(policy: LateSchemaPolicy) -> Self {
        Self {
            schema: None,
            policy,
            unresolved_files: Vec::new(),
            pending_reprocess: Vec::new(),
        }
    }

    /// The currently cached schema, if any.
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Discard the cached schema and bookkeeping between unrelated batches.
    pub fn reset(&mut self) {
        self.schema = None;
        self.unresolved_files.clear();
        self.pending_reprocess.clear();
    }

    fn parse_schema_file(&mut self, file_name: &str, source: &str) -> Result<()> {
        let schema: Schema = serde_json::from_str(source)
            .map_err(|e| Error::SchemaLoad(format!("could not load '{}': {}", file_name, e)))?;
        if schema.definitions.is_empty() {
            return Err(Error::SchemaLoad(format!(
                "no usable definitions in '{}'",
                file_name
            )));
        }
        tracing::debug!(
            "loaded schema '{}' with {} definitions",
            file_name,
            schema.definitions.len()
        );
        self.schema = Some(schema);
        if self.policy == LateSchemaPolicy::ReprocessInstances {
            self.pending_reprocess
                .extend(std::mem::take(&mut self.unresolved_files));
        }
        Ok(())
    }

    fn parse_instance_file(
        &mut self,
        file_name: &str,
        source: &str,
        sink: &mut TokenSink,
    ) -> Result<()> {
        let root: ModelElement = serde_json::from_str(source)
            .map_err(|e| Error::Parse(format!("malformed model '{}': {}", file_name, e)))?;

        if self.schema.is_none() {
            sink.warn("instance parsed without a schema");
            self.unresolved_files.push(file_name.to_string());
        }

        let mut position = 0;
        self.walk_element(&root, 1, &mut position, sink);
        Ok(())
    }

    fn walk_element(
        &self,
        element: &ModelElement,
        depth: u32,
        position: &mut u32,
        sink: &mut TokenSink,
    ) {
        match self
            .schema
            .as_ref()
            .and_then(|s| s.definition(&element.type_name))
        {
            Some(definition) => {
                emit(sink, ModelTokenType::ElementBegin, position, depth, &element.type_name);
                for attribute in &definition.attributes {
                    if element.attributes.contains_key(attribute) {
                        emit(sink, ModelTokenType::Attribute, position, depth, attribute);
                    }
                }
                for reference in &definition.references {
                    if element.references.contains_key(reference) {
                        emit(sink, ModelTokenType::Reference, position, depth, reference);
                    }
                }
                for child in &element.children {
                    self.walk_element(child, depth + 1, position, sink);
                }
                emit(sink, ModelTokenType::ElementEnd, position, depth, &element.type_name);
            }
            None => {
                emit(
                    sink,
                    ModelTokenType::UnresolvedElement,
                    position,
                    depth,
                    &element.type_name,
                );
                for child in &element.children {
                    self.walk_element(child, depth + 1, position, sink);
                }
            }
        }
    }
}

/// Emit one model token at the next synthesized document-order position.
fn emit(
    sink: &mut TokenSink,
    token_type: ModelTokenType,
    position: &mut u32,
    depth: u32,
    name: &str,
) {
    *position += 1;
    sink.emit(TokenType::Model(token_type), *position, depth, name.len() as u32);
}

impl Default for ModelFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontend for ModelFrontend {
    fn language_name(&self) -> &str {
        "Model"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn parse_file(&mut self, file_name: &str, source: &str, sink: &mut TokenSink) -> Result<()> {
        if file_name.ends_with(SCHEMA_SUFFIX) {
            self.parse_schema_file(file_name, source)
        } else {
            self.parse_instance_file(file_name, source, sink)
        }
    }

    fn take_reprocess_requests(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending_reprocess)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::Severity;
    use crate::frontend::framework::parse;
    use std::fs;

    const SCHEMA: &str = r#"{
        "definitions": [
            {"name": "Library", "attributes": ["name"], "references": ["books"]},
            {"name": "Book", "attributes": ["title", "year"]}
        ]
    }"#;

    const INSTANCE: &str = r#"{
        "type": "Library",
        "attributes": {"name": "Main"},
        "references": {"books": ["b1"]},
        "children": [
            {"type": "Book", "attributes": {"title": "Dune", "year": 1965}},
            {"type": "Magazine", "attributes": {"title": "Wired"}}
        ]
    }"#;

    fn model_types(tokens: &[crate::token::Token]) -> Vec<ModelTokenType> {
        tokens
            .iter()
            .filter_map(|t| match t.token_type {
                TokenType::Model(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    fn write_batch(dir: &std::path::Path) {
        fs::write(dir.join("library.schema.json"), SCHEMA).unwrap();
        fs::write(dir.join("main.model.json"), INSTANCE).unwrap();
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_schema_then_instance_resolves_types() {
        let dir = tempfile::tempdir().unwrap();
        write_batch(dir.path());
        let mut frontend = ModelFrontend::new();

        let batch = parse(
            &mut frontend,
            dir.path(),
            &names(&["library.schema.json", "main.model.json"]),
        )
        .unwrap();

        assert_eq!(batch.errors, 0);
        assert_eq!(batch.warnings().count(), 0);
        assert_eq!(frontend.schema().unwrap().definitions.len(), 2);
        assert_eq!(
            model_types(&batch.tokens),
            vec![
                ModelTokenType::ElementBegin,   // Library
                ModelTokenType::Attribute,      // name
                ModelTokenType::Reference,      // books
                ModelTokenType::ElementBegin,   // Book
                ModelTokenType::Attribute,      // title
                ModelTokenType::Attribute,      // year
                ModelTokenType::ElementEnd,
                ModelTokenType::UnresolvedElement, // Magazine is not defined
                ModelTokenType::ElementEnd,
            ]
        );
    }

    #[test]
    fn test_instance_without_schema_warns_once_and_degrades() {
        let dir = tempfile::tempdir().unwrap();
        write_batch(dir.path());
        let mut frontend = ModelFrontend::new();

        let batch = parse(
            &mut frontend,
            dir.path(),
            &names(&["main.model.json", "library.schema.json"]),
        )
        .unwrap();

        assert_eq!(batch.errors, 0);
        let warnings: Vec<_> = batch.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].file, "main.model.json");

        // degraded interpretation: every element is unresolved
        assert_eq!(
            model_types(&batch.tokens),
            vec![
                ModelTokenType::UnresolvedElement,
                ModelTokenType::UnresolvedElement,
                ModelTokenType::UnresolvedElement,
            ]
        );
        // the late schema still loads for whatever comes next
        assert!(frontend.schema().is_some());
    }

    #[test]
    fn test_reprocess_policy_splices_earlier_instances() {
        let dir = tempfile::tempdir().unwrap();
        write_batch(dir.path());
        let mut frontend = ModelFrontend::with_policy(LateSchemaPolicy::ReprocessInstances);

        let batch = parse(
            &mut frontend,
            dir.path(),
            &names(&["main.model.json", "library.schema.json"]),
        )
        .unwrap();

        assert_eq!(batch.errors, 0);
        // the stale missing-schema warning is dropped with the reprocess
        assert_eq!(batch.warnings().count(), 0);
        // sentinels keep input order
        let sentinels: Vec<&str> = batch
            .tokens
            .iter()
            .filter(|t| t.token_type == TokenType::FileEnd)
            .map(|t| t.file.as_str())
            .collect();
        assert_eq!(sentinels, vec!["main.model.json", "library.schema.json"]);
        // and the instance now resolves against the schema
        assert!(
            model_types(&batch.tokens)
                .iter()
                .any(|t| *t == ModelTokenType::ElementBegin)
        );
        assert_eq!(
            model_types(&batch.tokens)
                .iter()
                .filter(|t| **t == ModelTokenType::UnresolvedElement)
                .count(),
            1 // only the Magazine stays unresolved
        );
    }

    #[test]
    fn test_schema_load_failure_preserves_previous_schema() {
        let dir = tempfile::tempdir().unwrap();
        write_batch(dir.path());
        fs::write(dir.path().join("broken.schema.json"), "{ not json").unwrap();
        let mut frontend = ModelFrontend::new();

        let batch = parse(
            &mut frontend,
            dir.path(),
            &names(&[
                "library.schema.json",
                "broken.schema.json",
                "main.model.json",
            ]),
        )
        .unwrap();

        assert_eq!(batch.errors, 1);
        assert_eq!(batch.warnings().count(), 0);
        // previous schema survived the failed load and governed the instance
        assert_eq!(frontend.schema().unwrap().definitions.len(), 2);
        assert!(
            model_types(&batch.tokens)
                .iter()
                .any(|t| *t == ModelTokenType::ElementBegin)
        );
    }

    #[test]
    fn test_empty_schema_is_a_load_error() {
        let mut frontend = ModelFrontend::new();
        let mut sink = TokenSink::new("empty.schema.json");
        let result = frontend.parse_file("empty.schema.json", r#"{"definitions": []}"#, &mut sink);
        assert!(matches!(result, Err(Error::SchemaLoad(_))));
        assert!(frontend.schema().is_none());
    }

    #[test]
    fn test_new_schema_replaces_wholesale() {
        let mut frontend = ModelFrontend::new();
        let mut sink = TokenSink::new("a.schema.json");
        frontend
            .parse_file("a.schema.json", SCHEMA, &mut sink)
            .unwrap();
        frontend
            .parse_file(
                "b.schema.json",
                r#"{"definitions": [{"name": "Shelf"}]}"#,
                &mut sink,
            )
            .unwrap();

        let schema = frontend.schema().unwrap();
        assert_eq!(schema.definitions.len(), 1);
        assert!(schema.definition("Library").is_none());
        assert!(schema.definition("Shelf").is_some());
    }

    #[test]
    fn test_reset_clears_cached_schema() {
        let mut frontend = ModelFrontend::new();
        let mut sink = TokenSink::new("a.schema.json");
        frontend
            .parse_file("a.schema.json", SCHEMA, &mut sink)
            .unwrap();
        frontend.reset();
        assert!(frontend.schema().is_none());
    }

    #[test]
    fn test_synthesized_positions_are_increasing() {
        let mut frontend = ModelFrontend::new();
        let mut sink = TokenSink::new("a.schema.json");
        frontend
            .parse_file("a.schema.json", SCHEMA, &mut sink)
            .unwrap();
        let mut sink = TokenSink::new("main.model.json");
        frontend
            .parse_file("main.model.json", INSTANCE, &mut sink)
            .unwrap();
        let (tokens, _) = sink.into_parts();

        let lines: Vec<u32> = tokens.iter().map(|t| t.line.unwrap()).collect();
        let mut sorted = lines.clone();
        sorted.sort();
        assert_eq!(lines, sorted);
        assert!(tokens.iter().all(|t| t.length.unwrap() > 0));
    }

    #[test]
    fn test_warning_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_batch(dir.path());
        let mut frontend = ModelFrontend::new();

        let batch = parse(&mut frontend, dir.path(), &names(&["main.model.json"])).unwrap();

        assert_eq!(batch.errors, 0);
        assert_eq!(
            batch
                .diagnostics
                .iter()
                .filter(|d| d.severity == Severity::Error)
                .count(),
            0
        );
        assert_eq!(batch.warnings().count(), 1);
    }
}
