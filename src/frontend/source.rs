//! Programming-language frontends backed by tree-sitter
//!
//! One generic [`SourceFrontend`] covers every supported general-purpose
//! language: a tree-sitter grammar supplies the lexer/filter/parser pipeline,
//! and a per-language [`TokenMapping`] tells the walker which constructs
//! matter. Lexical noise (whitespace, comments) stays out of the stream
//! because nothing maps it.

use super::framework::{Frontend, TokenSink};
use super::walker::{TokenMapping, TreeWalker};
use crate::token::{SourceTokenType, TokenType};
use crate::{Error, Result};
use tree_sitter::{Language, Parser};

fn src(token_type: SourceTokenType) -> TokenType {
    TokenType::Source(token_type)
}

/// A tree-sitter based frontend for one programming language.
pub struct SourceFrontend {
    language: Language,
    language_name: &'static str,
    extensions: &'static [&'static str],
    mapping: TokenMapping,
}

impl SourceFrontend {
    pub fn new(
        language: Language,
        language_name: &'static str,
        extensions: &'static [&'static str],
        mapping: TokenMapping,
    ) -> Self {
        Self {
            language,
            language_name,
            extensions,
            mapping,
        }
    }

    /// Create the Python frontend.
    pub fn python() -> Self {
        let mapping = TokenMapping::new()
            .map("import_statement", src(SourceTokenType::Import))
            .map("import_from_statement", src(SourceTokenType::Import))
            .map_pair(
                "class_definition",
                src(SourceTokenType::ClassBegin),
                src(SourceTokenType::ClassEnd),
            )
            .map_pair(
                "function_definition",
                src(SourceTokenType::FunctionBegin),
                src(SourceTokenType::FunctionEnd),
            )
            .map("if_statement", src(SourceTokenType::If))
            .map("elif_clause", src(SourceTokenType::If))
            .map("else_clause", src(SourceTokenType::Else))
            .map("for_statement", src(SourceTokenType::Loop))
            .map("while_statement", src(SourceTokenType::Loop))
            .map("break_statement", src(SourceTokenType::Break))
            .map("continue_statement", src(SourceTokenType::Continue))
            .map("return_statement", src(SourceTokenType::Return))
            .map("raise_statement", src(SourceTokenType::Throw))
            .map("try_statement", src(SourceTokenType::TryBegin))
            .map("except_clause", src(SourceTokenType::Catch))
            .map("finally_clause", src(SourceTokenType::Finally))
            .map("assignment", src(SourceTokenType::Assign))
            .map("augmented_assignment", src(SourceTokenType::Assign))
            .map("call", src(SourceTokenType::Call))
            .map("lambda", src(SourceTokenType::Lambda));

        Self::new(
            tree_sitter_python::LANGUAGE.into(),
            "Python",
            &["py", "pyi"],
            mapping,
        )
    }

    /// Create the JavaScript frontend.
    pub fn javascript() -> Self {
        let mapping = TokenMapping::new()
            .map("import_statement", src(SourceTokenType::Import))
            .map_pair(
                "class_declaration",
                src(SourceTokenType::ClassBegin),
                src(SourceTokenType::ClassEnd),
            )
            .map_pair(
                "function_declaration",
                src(SourceTokenType::FunctionBegin),
                src(SourceTokenType::FunctionEnd),
            )
            .map_pair(
                "generator_function_declaration",
                src(SourceTokenType::FunctionBegin),
                src(SourceTokenType::FunctionEnd),
            )
            .map_pair(
                "method_definition",
                src(SourceTokenType::FunctionBegin),
                src(SourceTokenType::FunctionEnd),
            )
            .map_pair(
                "function_expression",
                src(SourceTokenType::FunctionBegin),
                src(SourceTokenType::FunctionEnd),
            )
            .map("arrow_function", src(SourceTokenType::Lambda))
            .map("if_statement", src(SourceTokenType::If))
            .map("else_clause", src(SourceTokenType::Else))
            .map("for_statement", src(SourceTokenType::Loop))
            .map("for_in_statement", src(SourceTokenType::Loop))
            .map("while_statement", src(SourceTokenType::Loop))
            .map("do_statement", src(SourceTokenType::Loop))
            .map("break_statement", src(SourceTokenType::Break))
            .map("continue_statement", src(SourceTokenType::Continue))
            .map("return_statement", src(SourceTokenType::Return))
            .map("throw_statement", src(SourceTokenType::Throw))
            .map("try_statement", src(SourceTokenType::TryBegin))
            .map("catch_clause", src(SourceTokenType::Catch))
            .map("finally_clause", src(SourceTokenType::Finally))
            .map("assignment_expression", src(SourceTokenType::Assign))
            .map("augmented_assignment_expression", src(SourceTokenType::Assign))
            .map("variable_declaration", src(SourceTokenType::Assign))
            .map("lexical_declaration", src(SourceTokenType::Assign))
            .map("call_expression", src(SourceTokenType::Call))
            .map("new_expression", src(SourceTokenType::Call));

        Self::new(
            tree_sitter_javascript::LANGUAGE.into(),
            "JavaScript",
            &["js", "jsx", "mjs", "cjs"],
            mapping,
        )
    }
}

impl Frontend for SourceFrontend {
    fn language_name(&self) -> &str {
        self.language_name
    }

    fn file_extensions(&self) -> &[&str] {
        self.extensions
    }

    fn parse_file(&mut self, file_name: &str, source: &str, sink: &mut TokenSink) -> Result<()> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| Error::Grammar(format!("failed to load grammar: {}", e)))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| Error::Parse(format!("no parse structure produced for '{}'", file_name)))?;

        let root = tree.root_node();
        if root.is_error() {
            return Err(Error::Parse(format!(
                "unrecoverable syntax errors in '{}'",
                file_name
            )));
        }

        // One independent top-to-bottom walk per top-level child of the
        // entry structure, preserving their relative order.
        let walker = TreeWalker::new(&self.mapping);
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            walker.walk(child, sink);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Token;

    fn parse_source(frontend: &mut SourceFrontend, name: &str, source: &str) -> Vec<Token> {
        let mut sink = TokenSink::new(name);
        frontend.parse_file(name, source, &mut sink).unwrap();
        sink.into_parts().0
    }

    #[test]
    fn test_python_constructs() {
        let mut frontend = SourceFrontend::python();
        let source = "\
import os

class Greeter:
    def greet(self, name):
        if name:
            return name
        return \"world\"

g = Greeter()
";
        let tokens = parse_source(&mut frontend, "greeter.py", source);
        let types: Vec<TokenType> = tokens.iter().map(|t| t.token_type).collect();

        assert_eq!(
            types,
            vec![
                src(SourceTokenType::Import),
                src(SourceTokenType::ClassBegin),
                src(SourceTokenType::FunctionBegin),
                src(SourceTokenType::If),
                src(SourceTokenType::Return),
                src(SourceTokenType::Return),
                src(SourceTokenType::FunctionEnd),
                src(SourceTokenType::ClassEnd),
                src(SourceTokenType::Assign),
                src(SourceTokenType::Call),
            ]
        );
    }

    #[test]
    fn test_python_token_order_matches_source_order() {
        let mut frontend = SourceFrontend::python();
        let source = "a = 1\nb = f(a)\nfor i in b:\n    print(i)\n";
        let tokens = parse_source(&mut frontend, "order.py", source);

        let positions: Vec<(u32, u32)> = tokens
            .iter()
            .map(|t| (t.line.unwrap(), t.column.unwrap()))
            .collect();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
        assert!(tokens.iter().all(|t| t.length.unwrap() > 0));
    }

    #[test]
    fn test_javascript_constructs() {
        let mut frontend = SourceFrontend::javascript();
        let source = "\
function add(a, b) {
  return a + b;
}
const total = add(1, 2);
";
        let tokens = parse_source(&mut frontend, "add.js", source);
        let types: Vec<TokenType> = tokens.iter().map(|t| t.token_type).collect();

        assert_eq!(
            types,
            vec![
                src(SourceTokenType::FunctionBegin),
                src(SourceTokenType::Return),
                src(SourceTokenType::FunctionEnd),
                src(SourceTokenType::Assign),
                src(SourceTokenType::Call),
            ]
        );
    }

    #[test]
    fn test_comments_and_whitespace_yield_nothing() {
        let mut frontend = SourceFrontend::python();
        let tokens = parse_source(&mut frontend, "c.py", "# just a comment\n\n   \n");
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_batch_isolates_an_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.py"), "x = 1\ny = 2\nz = 3\n").unwrap();
        // not valid UTF-8, so the file cannot even be read as source
        std::fs::write(dir.path().join("b.py"), [0xffu8, 0xfe, 0x00]).unwrap();
        let mut frontend = SourceFrontend::python();

        let batch = crate::frontend::framework::parse(
            &mut frontend,
            dir.path(),
            &["a.py".to_string(), "b.py".to_string()],
        )
        .unwrap();

        assert_eq!(batch.errors, 1);
        let types: Vec<TokenType> = batch.tokens.iter().map(|t| t.token_type).collect();
        assert_eq!(
            types,
            vec![
                src(SourceTokenType::Assign),
                src(SourceTokenType::Assign),
                src(SourceTokenType::Assign),
                TokenType::FileEnd,
                TokenType::FileEnd,
            ]
        );
        assert_eq!(batch.tokens[3].file, "a.py");
        assert_eq!(batch.tokens[4].file, "b.py");
    }

    #[test]
    fn test_extensions() {
        let frontend = SourceFrontend::python();
        assert!(frontend.can_handle(std::path::Path::new("a.py")));
        assert!(!frontend.can_handle(std::path::Path::new("a.js")));
    }
}
