//! Outline (bookmark) handling.
//!
//! An outline travels through four stages during a merge:
//!
//! 1. [`names`] indexes the source document's named destinations.
//! 2. [`parse`] reads the source `/Outlines` tree into [`OutlineNode`]s.
//! 3. [`annotate`] resolves every node to a page of the merged document,
//!    using [`resolve`] for the destination lookup.
//! 4. [`write`] materializes the combined tree in the merged document.
//!
//! Nodes carry raw destinations until annotation. Page indices are zero-based
//! throughout.

pub mod annotate;
pub mod names;
pub mod parse;
pub mod resolve;
pub mod write;

pub use annotate::annotate;
pub use names::{
    NamedDestination, NamedDestinationCarryOver, NamedDestinationIndex, count_named_destinations,
};
pub use parse::{has_outline, parse_outline};
pub use resolve::{resolve_destination, resolve_page};
pub use write::{OutlineWriteSummary, OutlineWriter, write_outline};

use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashMap;

/// Where an outline entry points, as found in the source document.
#[derive(Debug, Clone, Default)]
pub enum RawDestination {
    /// Explicit destination array, `[page /XYZ left top zoom]` and friends.
    Explicit(Vec<Object>),
    /// Destination given by name directly in `/Dest`.
    Named(String),
    /// Action dictionary from `/A`.
    Action(Dictionary),
    /// No target.
    #[default]
    None,
}

/// One entry of an outline tree.
#[derive(Debug, Clone, Default)]
pub struct OutlineNode {
    /// Display title, if the entry has one.
    pub title: Option<String>,
    /// Raw destination from the source document.
    pub destination: RawDestination,
    /// Zero-based page in the merged document, once resolved.
    pub page: Option<usize>,
    /// Child entries, in display order.
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    /// Create an entry with a title and nothing else.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Create an already-resolved entry pointing at `page`.
    pub fn with_page(title: impl Into<String>, page: usize) -> Self {
        Self {
            page: Some(page),
            ..Self::new(title)
        }
    }

    /// Set the raw destination.
    pub fn destination(mut self, destination: RawDestination) -> Self {
        self.destination = destination;
        self
    }

    /// Set the children.
    pub fn children(mut self, children: Vec<OutlineNode>) -> Self {
        self.children = children;
        self
    }

    /// Number of nodes below this one.
    pub fn descendant_count(&self) -> usize {
        count_nodes(&self.children)
    }
}

/// Total number of nodes in a forest.
pub fn count_nodes(nodes: &[OutlineNode]) -> usize {
    nodes.iter().map(|n| 1 + n.descendant_count()).sum()
}

/// A document's pages in page order, with reverse lookup by object id.
#[derive(Debug, Clone, Default)]
pub struct PageTable {
    refs: Vec<ObjectId>,
    positions: HashMap<ObjectId, usize>,
}

impl PageTable {
    /// Build the table from the document's page tree.
    pub fn from_document(doc: &Document) -> Self {
        Self::from_refs(doc.get_pages().into_values().collect())
    }

    /// Build the table from page references already in page order.
    pub fn from_refs(refs: Vec<ObjectId>) -> Self {
        let mut positions = HashMap::with_capacity(refs.len());
        for (index, id) in refs.iter().enumerate() {
            positions.entry(*id).or_insert(index);
        }
        Self { refs, positions }
    }

    /// Zero-based position of a page object.
    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// Page object at a zero-based position.
    pub fn get(&self, index: usize) -> Option<ObjectId> {
        self.refs.get(index).copied()
    }

    /// Number of pages.
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    /// Whether the document has no pages.
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}

/// Follow one level of indirection.
pub(crate) fn deref<'a>(doc: &'a Document, obj: &'a Object) -> lopdf::Result<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id),
        other => Ok(other),
    }
}

/// Look up `key` in `dict` and resolve it if it is a reference.
pub(crate) fn get_deref<'a>(
    doc: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Object> {
    dict.get(key).ok().and_then(|obj| deref(doc, obj).ok())
}
