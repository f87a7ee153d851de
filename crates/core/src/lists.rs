//! Nested list depth.

use crate::classify::is_list_item;
use crate::dom::{DocumentTree, NodeId};

/// Spaces of indentation per nesting level.
pub const INDENT_WIDTH: usize = 2;

/// Nesting depth of a list node: the number of strict ancestors that are
/// list items, whatever their type (bulleted, numbered, to-do, toggle).
///
/// `ul`/`ol` containers are transparent, so `<ul><li>` sits at depth 0 the
/// same way a top-level Notion list block does.
pub fn list_depth<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> usize {
    doc.ancestors(node)
        .into_iter()
        .filter(|&a| is_list_item(doc, a))
        .count()
}

/// Leading whitespace for a list line at `depth`.
pub fn indentation(depth: usize) -> String {
    " ".repeat(depth * INDENT_WIDTH)
}
