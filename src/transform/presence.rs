use super::{Context, Visitor};
use crate::ast::{Decl, DeclKind, TypeSpec};

/// Detects an existing interface with the target name. Never mutates.
pub struct PresenceCheck {
    interface: String,
}

impl PresenceCheck {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
        }
    }
}

impl Visitor for PresenceCheck {
    fn enter(&mut self, decl: &mut Decl, _cx: &mut Context) -> bool {
        // Only type declarations can hold the interface; function bodies may
        // shadow the name locally, which does not count.
        matches!(decl.kind, DeclKind::Type(_))
    }

    fn spec(&mut self, spec: &TypeSpec, cx: &mut Context) {
        if spec.is_interface && spec.name == self.interface {
            cx.metadata.already_present = true;
        }
    }
}
