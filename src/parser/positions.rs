//! Position conversion utilities.
//!
//! tree-sitter reports rows and byte columns; diagnostics want character
//! columns, so columns are recounted against the source line.

use crate::ast::{Position, Span};

/// Build a `Position` from a byte offset and the tree-sitter point at that offset.
pub fn position(source: &str, byte: usize, point: tree_sitter::Point) -> Position {
    let byte = byte.min(source.len());
    let line_start = byte.saturating_sub(point.column);
    let col = source
        .get(line_start..byte)
        .map(|s| s.chars().count())
        .unwrap_or(point.column);
    Position {
        byte,
        line: point.row,
        col,
    }
}

/// Span covered by a syntax node
pub fn node_span(source: &str, node: &tree_sitter::Node) -> Span {
    Span {
        start: position(source, node.start_byte(), node.start_position()),
        end: position(source, node.end_byte(), node.end_position()),
    }
}

/// Number of line breaks between two byte offsets
pub fn newlines_between(source: &str, from: usize, to: usize) -> usize {
    if from >= to {
        return 0;
    }
    source
        .get(from..to)
        .map(|s| s.matches('\n').count())
        .unwrap_or(0)
}
