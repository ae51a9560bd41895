//! Language Frontend Framework
//!
//! Each frontend drives a grammar pipeline (tree-sitter for programming
//! languages, a serde loader for structured models) and emits canonical
//! tokens into a shared sink. The batch driver never sees language-specific
//! logic; it handles ordering, per-file error isolation, and sentinels.

pub mod framework;
pub mod model;
pub mod source;
pub mod walker;

pub use framework::{Frontend, FrontendRegistry, TokenSink, default_registry, parse};
pub use model::{LateSchemaPolicy, ModelFrontend, Schema};
pub use source::SourceFrontend;
pub use walker::{TokenMapping, TreeWalker};
