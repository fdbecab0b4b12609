//! Writing an outline tree into a document.
//!
//! Every entry becomes an item dictionary:
//!
//! ```text
//! << /Title (...) /Parent 12 0 R /Next 15 0 R
//!    /Dest [7 0 R /XYZ null null null]
//!    /First 16 0 R /Last 18 0 R /Count 3 >>
//! ```
//!
//! With [`SiblingLinks::Compat`] each item gets exactly one sibling key:
//! `/Next` for all but the last item, `/Prev` for the last (a lone item
//! refers to itself). [`SiblingLinks::Full`] writes both keys wherever a
//! neighbour exists. `/Count` is the number of direct children written.

use lopdf::{Document, Object, ObjectId, dictionary};

use super::{OutlineNode, PageTable};
use crate::config::SiblingLinks;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{PdfStitchError, Result};
use crate::utils::text::encode_text;

/// Title used for entries without one.
const UNTITLED: &str = "-";

/// Outcome of writing an outline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutlineWriteSummary {
    /// Items written.
    pub written: usize,
    /// Entries left out, including the descendants of dropped entries.
    pub dropped: usize,
}

/// Writes a complete outline and links it into the catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineWriter {
    links: SiblingLinks,
}

impl OutlineWriter {
    /// Create a writer emitting the given sibling links.
    pub fn new(links: SiblingLinks) -> Self {
        Self { links }
    }

    /// Write `nodes` as the document outline.
    ///
    /// Entries without a page, or with a page the document does not have,
    /// are left out together with their subtree. When nothing is left the
    /// catalog gets no `/Outlines` entry at all.
    pub fn write(
        &self,
        doc: &mut Document,
        nodes: &[OutlineNode],
        diagnostics: &mut Diagnostics,
    ) -> Result<OutlineWriteSummary> {
        let mut context = WriteContext::new(doc, self.links, diagnostics);
        context.write_root(doc, nodes)?;
        Ok(context.summary)
    }
}

/// Write `nodes` into `doc`, returning the references allocated for the
/// entries that were kept.
///
/// With `parent: None` this is the outermost call: a `/Outlines` root is
/// created and set on the catalog. With `parent: Some(id)` the entries are
/// written as children of an existing item and the catalog is untouched.
pub fn write_outline(
    doc: &mut Document,
    nodes: &[OutlineNode],
    parent: Option<ObjectId>,
    links: SiblingLinks,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<ObjectId>> {
    let mut context = WriteContext::new(doc, links, diagnostics);
    match parent {
        Some(parent) => context.write_level(doc, nodes, parent),
        None => context.write_root(doc, nodes),
    }
}

struct WriteContext<'a> {
    pages: PageTable,
    links: SiblingLinks,
    diagnostics: &'a mut Diagnostics,
    summary: OutlineWriteSummary,
}

impl<'a> WriteContext<'a> {
    fn new(doc: &Document, links: SiblingLinks, diagnostics: &'a mut Diagnostics) -> Self {
        Self {
            pages: PageTable::from_document(doc),
            links,
            diagnostics,
            summary: OutlineWriteSummary::default(),
        }
    }

    fn write_root(&mut self, doc: &mut Document, nodes: &[OutlineNode]) -> Result<Vec<ObjectId>> {
        if !nodes.iter().any(|node| self.is_writable(node)) {
            self.drop_all(nodes);
            detach_outline(doc)?;
            return Ok(Vec::new());
        }

        let root_id = doc.new_object_id();
        let items = self.write_level(doc, nodes, root_id)?;

        let mut root = dictionary! {
            "Type" => "Outlines",
            "Count" => items.len() as i64,
        };
        if let (Some(first), Some(last)) = (items.first(), items.last()) {
            root.set("First", *first);
            root.set("Last", *last);
        }
        doc.objects.insert(root_id, Object::Dictionary(root));

        doc.catalog_mut()
            .map_err(|e| PdfStitchError::outline_failed(format!("Failed to get catalog: {e}")))?
            .set("Outlines", root_id);

        tracing::debug!(
            written = self.summary.written,
            dropped = self.summary.dropped,
            "wrote outline"
        );
        Ok(items)
    }

    fn write_level(
        &mut self,
        doc: &mut Document,
        nodes: &[OutlineNode],
        parent: ObjectId,
    ) -> Result<Vec<ObjectId>> {
        let kept: Vec<&OutlineNode> = nodes
            .iter()
            .filter(|node| {
                let writable = self.is_writable(node);
                if !writable {
                    self.report_dropped(node);
                }
                writable
            })
            .collect();

        let ids: Vec<ObjectId> = kept.iter().map(|_| doc.new_object_id()).collect();

        for (position, node) in kept.iter().enumerate() {
            let id = ids[position];
            let children = self.write_level(doc, &node.children, id)?;

            let mut item = dictionary! {
                "Title" => encode_text(node.title.as_deref().unwrap_or(UNTITLED)),
                "Parent" => parent,
            };
            self.link_siblings(&mut item, &ids, position);
            if let (Some(first), Some(last)) = (children.first(), children.last()) {
                item.set("First", *first);
                item.set("Last", *last);
                item.set("Count", children.len() as i64);
            }
            if let Some(dest) = node.page.and_then(|page| self.destination(page)) {
                item.set("Dest", dest);
            }

            doc.objects.insert(id, Object::Dictionary(item));
            self.summary.written += 1;
        }

        Ok(ids)
    }

    fn link_siblings(&self, item: &mut lopdf::Dictionary, ids: &[ObjectId], position: usize) {
        let next = ids.get(position + 1).copied();
        let prev = position.checked_sub(1).map(|p| ids[p]);

        match self.links {
            SiblingLinks::Compat => match next {
                Some(next) => item.set("Next", next),
                // the last item points back, a lone item at itself
                None => item.set("Prev", prev.unwrap_or(ids[position])),
            },
            SiblingLinks::Full => {
                if let Some(prev) = prev {
                    item.set("Prev", prev);
                }
                if let Some(next) = next {
                    item.set("Next", next);
                }
            }
        }
    }

    fn destination(&self, page: usize) -> Option<Object> {
        let page_id = self.pages.get(page)?;
        Some(Object::Array(vec![
            Object::Reference(page_id),
            Object::Name(b"XYZ".to_vec()),
            Object::Null,
            Object::Null,
            Object::Null,
        ]))
    }

    fn is_writable(&self, node: &OutlineNode) -> bool {
        node.page.is_some_and(|page| page < self.pages.len())
    }

    fn report_dropped(&mut self, node: &OutlineNode) {
        let descendants = node.descendant_count();
        self.summary.dropped += 1 + descendants;

        let title = node.title.as_deref().unwrap_or(UNTITLED);
        let reason = match node.page {
            Some(page) => format!("page {} does not exist", page + 1),
            None => "no destination page".to_string(),
        };
        let message = if descendants > 0 {
            format!("dropped outline entry '{title}' ({reason}) and {descendants} nested entries")
        } else {
            format!("dropped outline entry '{title}' ({reason})")
        };
        self.diagnostics
            .warn(DiagnosticKind::DroppedOutlineEntry { descendants }, message);
    }

    fn drop_all(&mut self, nodes: &[OutlineNode]) {
        for node in nodes {
            self.report_dropped(node);
        }
    }
}

/// Remove a stale `/Outlines` entry from the catalog.
fn detach_outline(doc: &mut Document) -> Result<()> {
    doc.catalog_mut()
        .map_err(|e| PdfStitchError::outline_failed(format!("Failed to get catalog: {e}")))?
        .remove(b"Outlines");
    Ok(())
}
