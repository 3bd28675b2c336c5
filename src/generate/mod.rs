mod output;
mod printer;
mod synth;

pub use output::Output;
pub use printer::GoPrinter;
pub use synth::{Artifacts, Synthesizer};

use crate::ast::SourceFile;
use crate::comments::CommentMap;

/// Generator trait - converts a `SourceFile` back to source code
pub trait Generator {
    fn generate(&self, file: &SourceFile, comments: &CommentMap) -> String;
}
