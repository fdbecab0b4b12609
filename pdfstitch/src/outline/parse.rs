//! Reading `/Outlines` trees.

use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashSet;

use super::{OutlineNode, RawDestination, deref, get_deref};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::utils::text::object_text;

/// Outline nesting deeper than this is cut off.
pub const MAX_OUTLINE_DEPTH: usize = 256;

/// Whether the document catalog has an `/Outlines` entry.
pub fn has_outline(doc: &Document) -> bool {
    doc.catalog()
        .map(|catalog| catalog.has(b"Outlines"))
        .unwrap_or(false)
}

/// Read the document outline into a tree.
///
/// Returns an empty list when the document has no `/Outlines`. Sibling
/// chains are followed through `/Next` only. A chain that revisits an item,
/// nests too deeply or links to something other than a dictionary is cut at
/// that point with a warning; everything read before the cut is kept.
pub fn parse_outline(doc: &Document, diagnostics: &mut Diagnostics) -> Vec<OutlineNode> {
    let Some(root) = doc
        .catalog()
        .ok()
        .and_then(|catalog| get_deref(doc, catalog, b"Outlines"))
    else {
        diagnostics.info(DiagnosticKind::MissingOutline, "document has no outline");
        return Vec::new();
    };

    let Ok(root) = root.as_dict() else {
        diagnostics.warn(
            DiagnosticKind::MalformedOutline,
            "/Outlines is not a dictionary",
        );
        return Vec::new();
    };

    let Ok(first) = root.get(b"First") else {
        return Vec::new();
    };

    let mut parser = OutlineParser {
        doc,
        visited: HashSet::new(),
        diagnostics,
    };
    let nodes = parser.parse_chain(first, 0);
    tracing::debug!(
        entries = super::count_nodes(&nodes),
        "parsed outline"
    );
    nodes
}

struct OutlineParser<'a> {
    doc: &'a Document,
    visited: HashSet<ObjectId>,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> OutlineParser<'a> {
    /// Parse a sibling chain starting at `first`.
    fn parse_chain(&mut self, first: &'a Object, depth: usize) -> Vec<OutlineNode> {
        if depth >= MAX_OUTLINE_DEPTH {
            self.diagnostics.warn(
                DiagnosticKind::OutlineTooDeep,
                format!("outline nested deeper than {MAX_OUTLINE_DEPTH} levels, ignoring the rest"),
            );
            return Vec::new();
        }

        let mut nodes = Vec::new();
        let mut current = Some(first);

        while let Some(link) = current {
            let Some(item) = self.follow(link) else {
                break;
            };
            nodes.push(self.parse_item(item, depth));
            current = item.get(b"Next").ok();
        }

        nodes
    }

    /// Resolve a `/First` or `/Next` link to an item dictionary.
    fn follow(&mut self, link: &'a Object) -> Option<&'a Dictionary> {
        if let Object::Reference(id) = link
            && !self.visited.insert(*id)
        {
            self.diagnostics.warn(
                DiagnosticKind::OutlineCycle,
                format!("outline item {} {} R is linked more than once", id.0, id.1),
            );
            return None;
        }

        match deref(self.doc, link) {
            Ok(Object::Dictionary(dict)) => Some(dict),
            _ => {
                self.diagnostics.warn(
                    DiagnosticKind::MalformedOutline,
                    "outline link does not lead to an item dictionary",
                );
                None
            }
        }
    }

    fn parse_item(&mut self, item: &'a Dictionary, depth: usize) -> OutlineNode {
        let title = get_deref(self.doc, item, b"Title").and_then(object_text);
        let destination = self.destination(item);
        let children = match item.get(b"First") {
            Ok(first) => self.parse_chain(first, depth + 1),
            Err(_) => Vec::new(),
        };

        OutlineNode {
            title,
            destination,
            page: None,
            children,
        }
    }

    fn destination(&self, item: &Dictionary) -> RawDestination {
        if let Some(dest) = get_deref(self.doc, item, b"Dest") {
            return match dest {
                Object::Array(array) => RawDestination::Explicit(array.clone()),
                // some producers wrap the array the way name-tree values are wrapped
                Object::Dictionary(dict) => match get_deref(self.doc, dict, b"D") {
                    Some(Object::Array(array)) => RawDestination::Explicit(array.clone()),
                    _ => RawDestination::None,
                },
                other => object_text(other)
                    .map(RawDestination::Named)
                    .unwrap_or_default(),
            };
        }

        if let Some(Object::Dictionary(action)) = get_deref(self.doc, item, b"A") {
            let mut action = action.clone();
            let target = match action.get(b"D") {
                Ok(Object::Reference(id)) => self.doc.get_object(*id).ok().cloned(),
                _ => None,
            };
            if let Some(target) = target {
                action.set("D", target);
            }
            return RawDestination::Action(action);
        }

        RawDestination::None
    }
}
