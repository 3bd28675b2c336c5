use crate::ast::{DeclId, Signature, SkipReason};

/// Metadata collected during transformation
/// This is populated by the plugins and read by the driver
#[derive(Debug, Clone, Default)]
pub struct TransformMetadata {
    /// An interface with the target name already exists
    pub already_present: bool,
    /// Signatures of promoted functions, in source order
    pub signatures: Vec<Signature>,
    /// Ids of the promoted declarations, parallel to `signatures`
    pub promoted: Vec<DeclId>,
    pub skipped: Vec<(String, SkipReason)>,
}

impl TransformMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn promoted_names(&self) -> Vec<&str> {
        self.signatures.iter().map(|s| s.name.as_str()).collect()
    }
}
