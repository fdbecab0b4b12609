//! Translating source-local destinations into merged page numbers.

use super::names::NamedDestinationIndex;
use super::resolve::resolve_destination;
use super::{OutlineNode, PageTable};
use crate::diagnostics::Diagnostics;

/// Resolve every node of a freshly parsed tree and shift it by `start_page`.
///
/// `pages` and `index` belong to the document the tree was parsed from, and
/// `start_page` is the number of merged pages that precede it. Nodes that do
/// not resolve keep `page: None` and stay in the tree so their children can
/// still be placed. Nodes that already carry a page are left as they are.
pub fn annotate(
    nodes: Vec<OutlineNode>,
    start_page: usize,
    pages: &PageTable,
    index: &NamedDestinationIndex,
    diagnostics: &mut Diagnostics,
) -> Vec<OutlineNode> {
    nodes
        .into_iter()
        .map(|mut node| {
            if node.page.is_none() {
                node.page = resolve_destination(&node.destination, pages, index, diagnostics)
                    .map(|page| page + start_page);
            }
            node.children = annotate(node.children, start_page, pages, index, diagnostics);
            node
        })
        .collect()
}
