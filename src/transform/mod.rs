mod metadata;
mod presence;
mod promote;

pub use metadata::TransformMetadata;
pub use presence::PresenceCheck;
pub use promote::Promoter;

use crate::ast::{CommentGroup, Decl, DeclKind, IdAllocator, SourceFile, TypeSpec};
use crate::comments::CommentMap;

/// What a visitor may touch besides the declaration it is visiting
pub struct Context<'a> {
    pub ids: &'a mut IdAllocator,
    /// Comment groups of the file, for reading doc comments
    pub groups: &'a [CommentGroup],
    pub comments: &'a mut CommentMap,
    pub metadata: &'a mut TransformMetadata,
}

/// Visitor over top-level declarations
pub trait Visitor {
    /// Called for each top-level declaration. Return `true` to visit the
    /// type specs inside it; nothing deeper is ever visited.
    fn enter(&mut self, _decl: &mut Decl, _cx: &mut Context) -> bool {
        false
    }

    /// Called for each spec of a `type` declaration the visitor descended into.
    fn spec(&mut self, _spec: &TypeSpec, _cx: &mut Context) {}

    /// Called after the declaration (and its specs, if any).
    fn exit(&mut self, _decl: &mut Decl, _cx: &mut Context) {}
}

/// Walk the top-level declarations of `file` in source order.
pub fn walk(
    file: &mut SourceFile,
    comments: &mut CommentMap,
    visitor: &mut dyn Visitor,
    metadata: &mut TransformMetadata,
) {
    let SourceFile {
        decls,
        ids,
        comments: groups,
        ..
    } = file;
    let mut cx = Context {
        ids,
        groups,
        comments,
        metadata,
    };

    for decl in decls.iter_mut() {
        if visitor.enter(decl, &mut cx) {
            if let DeclKind::Type(type_decl) = &decl.kind {
                for spec in &type_decl.specs {
                    visitor.spec(spec, &mut cx);
                }
            }
        }
        visitor.exit(decl, &mut cx);
    }
}

/// Transformer that applies a series of plugins to a file
pub struct Transformer {
    plugins: Vec<Box<dyn Visitor>>,
    pub metadata: TransformMetadata,
}

impl Transformer {
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
            metadata: TransformMetadata::new(),
        }
    }

    pub fn add<V: Visitor + 'static>(mut self, visitor: V) -> Self {
        self.plugins.push(Box::new(visitor));
        self
    }

    pub fn transform(&mut self, file: &mut SourceFile, comments: &mut CommentMap) -> &TransformMetadata {
        for plugin in &mut self.plugins {
            walk(file, comments, plugin.as_mut(), &mut self.metadata);
        }

        &self.metadata
    }
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new()
    }
}
