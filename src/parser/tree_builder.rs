use super::positions::node_span;
use crate::ast::*;
use crate::error::{ErrorKind, ParseError};
use std::sync::Arc;
use tree_sitter::Node;

/// Builds a `SourceFile` from a tree-sitter `source_file` node
pub struct TreeBuilder {
    source: Arc<str>,
    /// Comments waiting to be closed into a group
    pending: Vec<Comment>,
    groups: Vec<CommentGroup>,
    /// End line of the last top-level declaration
    last_decl_end: Option<usize>,
}

impl TreeBuilder {
    pub fn new(source: Arc<str>) -> Self {
        Self {
            source,
            pending: Vec::new(),
            groups: Vec::new(),
            last_decl_end: None,
        }
    }

    pub fn build(mut self, root: Node) -> Result<SourceFile, ParseError> {
        if root.has_error() {
            return Err(self.syntax_error(root));
        }

        let mut file = SourceFile::new(String::new(), self.source.clone());
        let mut package = None;

        let mut cursor = root.walk();
        let children: Vec<Node> = root.named_children(&mut cursor).collect();

        for child in children {
            if child.kind() == "comment" {
                self.push_comment(child);
                continue;
            }

            self.flush_group();
            let span = node_span(&self.source, &child);
            let text = self.text(child).to_string();
            let kind = match child.kind() {
                "package_clause" => {
                    let name = self.package_identifier(child);
                    package = Some(name.clone());
                    DeclKind::Package(name)
                }
                "import_declaration" => DeclKind::Import,
                "type_declaration" => DeclKind::Type(self.type_decl(child)),
                "var_declaration" | "const_declaration" => DeclKind::Value(self.value_decl(child)),
                "function_declaration" => DeclKind::Func(self.function(child, Receiver::None)),
                "method_declaration" => {
                    let receiver = child
                        .child_by_field_name("receiver")
                        .map(|r| Receiver::Declared(self.text(r).to_string()))
                        .unwrap_or(Receiver::None);
                    DeclKind::Func(self.function(child, receiver))
                }
                _ => DeclKind::Value(ValueDecl::default()),
            };
            file.push(kind, text, Some(span));
            self.last_decl_end = Some(span.end.line);
        }
        self.flush_group();

        file.package = package.ok_or_else(|| {
            ParseError::new(
                ErrorKind::MissingPackage,
                "Go files must start with a package clause.",
                node_span(&self.source, &root),
            )
            .with_help("Add `package <name>` before the first declaration")
        })?;
        file.comments = self.groups;
        Ok(file)
    }

    fn text(&self, node: Node) -> &str {
        self.source.get(node.byte_range()).unwrap_or("")
    }

    /// Add a comment to the pending group, closing the group first if the
    /// comment is not on the line right after it.
    fn push_comment(&mut self, node: Node) {
        let comment = Comment {
            text: self.text(node).to_string(),
            span: node_span(&self.source, &node),
        };

        if let Some(last) = self.pending.last() {
            let adjacent = comment.span.start.line <= last.span.end.line + 1;
            // A comment trailing a declaration stays alone on its line.
            let trailing = Some(last.span.start.line) == self.last_decl_end;
            if !adjacent || (trailing && comment.span.start.line > last.span.end.line) {
                self.flush_group();
            }
        }
        self.pending.push(comment);
    }

    fn flush_group(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let id = GroupId(self.groups.len());
        self.groups.push(CommentGroup {
            id,
            comments: std::mem::take(&mut self.pending),
        });
    }

    fn package_identifier(&self, clause: Node) -> String {
        let mut cursor = clause.walk();
        let name = clause
            .named_children(&mut cursor)
            .find(|n| n.kind() == "package_identifier");
        name.map(|n| self.text(n).to_string()).unwrap_or_default()
    }

    fn type_decl(&self, node: Node) -> TypeDecl {
        let mut cursor = node.walk();
        let specs = node
            .named_children(&mut cursor)
            .filter(|n| matches!(n.kind(), "type_spec" | "type_alias"))
            .filter_map(|spec| {
                let name = spec.child_by_field_name("name")?;
                let is_interface = spec
                    .child_by_field_name("type")
                    .is_some_and(|t| t.kind() == "interface_type");
                Some(TypeSpec {
                    name: self.text(name).to_string(),
                    is_interface,
                    is_alias: spec.kind() == "type_alias",
                })
            })
            .collect();
        TypeDecl { specs }
    }

    fn value_decl(&self, node: Node) -> ValueDecl {
        let mut names = Vec::new();
        self.collect_value_names(node, &mut names);
        ValueDecl { names }
    }

    fn collect_value_names(&self, node: Node, names: &mut Vec<String>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "var_spec" | "const_spec" => {
                    let mut spec_cursor = child.walk();
                    names.extend(
                        child
                            .children_by_field_name("name", &mut spec_cursor)
                            .map(|n| self.text(n).to_string()),
                    );
                }
                "var_spec_list" | "const_spec_list" => self.collect_value_names(child, names),
                _ => {}
            }
        }
    }

    fn function(&self, node: Node, receiver: Receiver) -> FuncDecl {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        let type_params = node
            .child_by_field_name("type_parameters")
            .map(|n| self.text(n).to_string());
        let params = node
            .child_by_field_name("parameters")
            .map(|n| self.params(n))
            .unwrap_or_default();
        let results = match node.child_by_field_name("result") {
            None => Results::None,
            Some(r) if r.kind() == "parameter_list" => Results::List(self.params(r)),
            Some(r) => Results::Type(self.text(r).to_string()),
        };

        FuncDecl {
            name,
            receiver,
            type_params,
            params,
            results,
            has_body: node.child_by_field_name("body").is_some(),
        }
    }

    fn params(&self, list: Node) -> Vec<Param> {
        let mut cursor = list.walk();
        let decls: Vec<Node> = list.named_children(&mut cursor).collect();
        decls
            .into_iter()
            .filter(|p| {
                matches!(p.kind(), "parameter_declaration" | "variadic_parameter_declaration")
            })
            .map(|p| {
                let mut name_cursor = p.walk();
                let names = p
                    .children_by_field_name("name", &mut name_cursor)
                    .map(|n| self.text(n).to_string())
                    .collect();
                let ty = p
                    .child_by_field_name("type")
                    .map(|t| self.text(t).to_string())
                    .unwrap_or_default();
                Param {
                    names,
                    ty,
                    variadic: p.kind() == "variadic_parameter_declaration",
                }
            })
            .collect()
    }

    /// Locate the first broken node and describe it
    fn syntax_error(&self, root: Node) -> ParseError {
        let node = first_error(root).unwrap_or(root);
        let span = node_span(&self.source, &node);
        if node.is_missing() {
            ParseError::new(
                ErrorKind::MissingToken,
                format!("Expected `{}` here.", node.kind()),
                span,
            )
        } else {
            let snippet: String = self.text(node).chars().take(40).collect();
            ParseError::new(
                ErrorKind::InvalidSyntax,
                format!("Unexpected `{}`.", snippet.trim()),
                span,
            )
            .with_help("mockable only rewrites files that compile")
        }
    }
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}
