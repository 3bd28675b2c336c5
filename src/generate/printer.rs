use super::Generator;
use super::output::Output;
use crate::ast::{format_params, Artifact, CommentGroup, Decl, DeclKind, Receiver, SourceFile, Span};
use crate::comments::{CommentMap, Owner, Placement};
use crate::parser::positions::newlines_between;

/// Prints a `SourceFile` back to Go.
///
/// Source declarations are printed from their original text and keep the
/// spacing they had (at most one blank line between items). Generated
/// declarations are laid out the way gofmt would.
pub struct GoPrinter;

/// A printable chunk: a declaration or a comment group
struct Item {
    text: String,
    span: Option<Span>,
}

impl GoPrinter {
    pub fn new() -> Self {
        Self
    }

    fn items(&self, file: &SourceFile, comments: &CommentMap) -> Vec<Item> {
        let mut items = Vec::new();
        // Comments owned by the file close the source part, before anything generated
        let last_source = file.decls.iter().rposition(|d| d.span.is_some());

        if last_source.is_none() {
            self.push_groups(file, comments, Owner::File, Placement::Trailing, &mut items);
        }
        for (index, decl) in file.decls.iter().enumerate() {
            let owner = Owner::Decl(decl.id);
            self.push_groups(file, comments, owner, Placement::Leading, &mut items);
            items.push(Item {
                text: self.decl(decl),
                span: decl.span,
            });
            self.push_groups(file, comments, owner, Placement::Trailing, &mut items);
            if Some(index) == last_source {
                self.push_groups(file, comments, Owner::File, Placement::Trailing, &mut items);
            }
        }
        items
    }

    fn push_groups(
        &self,
        file: &SourceFile,
        comments: &CommentMap,
        owner: Owner,
        placement: Placement,
        items: &mut Vec<Item>,
    ) {
        for id in comments.groups(owner, placement) {
            if let Some(group) = file.comments.iter().find(|g| g.id == id) {
                items.push(Item {
                    text: self.group(file, group),
                    span: Some(group.span()),
                });
            }
        }
    }

    fn group(&self, file: &SourceFile, group: &CommentGroup) -> String {
        let mut text = String::new();
        let mut prev_end: Option<usize> = None;
        for comment in &group.comments {
            if let Some(end) = prev_end {
                let breaks = newlines_between(&file.source, end, comment.span.start.byte);
                text.push_str(if breaks == 0 { " " } else { "\n" });
            }
            text.push_str(&comment.text);
            prev_end = Some(comment.span.end.byte);
        }
        text
    }

    fn decl(&self, decl: &Decl) -> String {
        match &decl.kind {
            DeclKind::Func(func) => match &func.receiver {
                Receiver::Synthetic { name, ty } => {
                    let rest = decl.text.strip_prefix("func").unwrap_or(&decl.text);
                    format!("func ({} {}) {}", name, ty, rest.trim_start())
                }
                _ => decl.text.clone(),
            },
            DeclKind::Artifact(artifact) => self.artifact(artifact),
            _ => decl.text.clone(),
        }
    }

    fn artifact(&self, artifact: &Artifact) -> String {
        let mut out = Output::new();
        match artifact {
            Artifact::Interface { name, methods } => {
                if methods.is_empty() {
                    out.push(&format!("type {} interface{{}}", name));
                } else {
                    out.line(0, &format!("type {} interface {{", name));
                    for method in methods {
                        out.line(1, &method.method_spec());
                    }
                    out.push("}");
                }
            }
            Artifact::Struct { name } => {
                out.push(&format!("type {} struct{{}}", name));
            }
            Artifact::Variable {
                name,
                ty,
                implementation,
            } => {
                out.push(&format!("var {} {} = &{}{{}}", name, ty, implementation));
            }
            Artifact::Lock { name } => {
                out.push(&format!("var {} sync.RWMutex", name));
            }
            Artifact::Getter {
                name,
                ty,
                variable,
                lock,
            } => {
                out.line(0, &format!("func {}() {} {{", name, ty));
                out.line(1, &format!("{}.RLock()", lock));
                out.line(1, &format!("defer {}.RUnlock()", lock));
                out.line(1, &format!("return {}", variable));
                out.push("}");
            }
            Artifact::Setter {
                name,
                param,
                ty,
                variable,
                lock,
            } => {
                out.line(0, &format!("func {}({} {}) {} {{", name, param, ty, ty));
                if let Some(lock) = lock {
                    out.line(1, &format!("{}.Lock()", lock));
                    out.line(1, &format!("defer {}.Unlock()", lock));
                }
                out.line(1, &format!("old := {}", variable));
                out.line(1, &format!("{} = {}", variable, param));
                out.line(1, "return old");
                out.push("}");
            }
            Artifact::Delegate {
                name,
                params,
                results,
                target,
                args,
            } => {
                out.line(0, &format!("func {}({}){} {{", name, format_params(params), results));
                let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                let call = format!("{}.{}({})", target, name, args.join(", "));
                if results.is_empty() {
                    out.line(1, &call);
                } else {
                    out.line(1, &format!("return {}", call));
                }
                out.push("}");
            }
        }
        out.finish()
    }
}

impl Default for GoPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for GoPrinter {
    fn generate(&self, file: &SourceFile, comments: &CommentMap) -> String {
        let items = self.items(file, comments);
        let mut code = String::new();
        let mut prev: Option<&Item> = None;

        for item in &items {
            if let Some(prev) = prev {
                let separator = match (prev.span, item.span) {
                    (Some(a), Some(b)) => match newlines_between(&file.source, a.end.byte, b.start.byte) {
                        0 => " ",
                        1 => "\n",
                        _ => "\n\n",
                    },
                    _ => "\n\n",
                };
                code.push_str(separator);
            }
            code.push_str(&item.text);
            prev = Some(item);
        }

        code.push('\n');
        code
    }
}
