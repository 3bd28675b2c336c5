pub mod positions;
mod tree_builder;

use tree_builder::TreeBuilder;

use crate::ast::SourceFile;
use crate::error::{ErrorKind, ParseError};
use std::sync::Arc;

/// Parser trait - converts source code to a `SourceFile`
pub trait Parser {
    fn parse(&self, source: &str) -> Result<SourceFile, ParseError>;
}

/// Go parser backed by tree-sitter
pub struct GoParser {
    // Configuration only, no state
}

impl GoParser {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for GoParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for GoParser {
    fn parse(&self, source: &str) -> Result<SourceFile, ParseError> {
        let tree = parse_tree(source)?;
        let source_arc: Arc<str> = Arc::from(source);
        TreeBuilder::new(source_arc).build(tree.root_node())
    }
}

/// Package name declared by a Go file, without building the full model.
/// Files that do not parse far enough to show a package clause yield `None`.
pub fn package_name(source: &str) -> Option<String> {
    let tree = parse_tree(source).ok()?;
    let root = tree.root_node();
    let mut cursor = root.walk();
    let clause = root
        .named_children(&mut cursor)
        .find(|n| n.kind() == "package_clause")?;
    let mut cursor = clause.walk();
    let name = clause
        .named_children(&mut cursor)
        .find(|n| n.kind() == "package_identifier")?;
    source.get(name.byte_range()).map(str::to_string)
}

fn parse_tree(source: &str) -> Result<tree_sitter::Tree, ParseError> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| {
            ParseError::new(
                ErrorKind::InvalidSyntax,
                format!("failed to load Go grammar: {}", e),
                Default::default(),
            )
        })?;
    parser.parse(source, None).ok_or_else(|| {
        ParseError::new(ErrorKind::InvalidSyntax, "parser gave up on this file", Default::default())
    })
}
