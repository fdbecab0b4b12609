//! Page tree grafting.
//!
//! Each source document's page tree root is hung below the merged
//! document's root `/Pages` node. Pages keep their inherited attributes
//! (`/MediaBox`, `/Resources`, `/Rotate`) because the intermediate node they
//! inherit from comes along unchanged.

use lopdf::{Document, Object, ObjectId, dictionary};

use crate::error::{PdfStitchError, Result};

/// Lowest version written for a merged document.
const MIN_VERSION: &str = "1.5";

/// Builds a merged document by appending whole documents.
#[derive(Debug)]
pub struct PageAppender {
    document: Document,
    pages_id: ObjectId,
    page_count: usize,
}

impl PageAppender {
    /// Start an empty document with a fresh catalog and page tree root.
    pub fn new() -> Self {
        let mut document = Document::with_version(MIN_VERSION);

        let pages_id = document.new_object_id();
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 0,
            }),
        );

        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);

        Self {
            document,
            pages_id,
            page_count: 0,
        }
    }

    /// Renumber `source` so its object ids start above every id in use.
    ///
    /// References inside `source`, its trailer included, are rewritten to
    /// match.
    pub fn renumber(&self, source: &mut Document) {
        source.renumber_objects_with(self.document.max_id + 1);
    }

    /// Append every page of `source`, returning how many were added.
    ///
    /// `source` is renumbered first unless that already happened. Its
    /// catalog is discarded, so outlines and name trees that only the
    /// catalog referenced become unreachable.
    pub fn append(&mut self, mut source: Document) -> Result<usize> {
        if self.collides(&source) {
            self.renumber(&mut source);
        }

        let page_count = source.get_pages().len();

        let catalog_id = source
            .trailer
            .get(b"Root")
            .and_then(|root| root.as_reference())
            .map_err(|e| PdfStitchError::merge_failed(format!("Source has no catalog: {e}")))?;
        let source_pages_id = source
            .catalog()
            .and_then(|catalog| catalog.get(b"Pages"))
            .and_then(|pages| pages.as_reference())
            .map_err(|e| {
                PdfStitchError::merge_failed(format!("Failed to get pages reference: {e}"))
            })?;

        source.objects.remove(&catalog_id);

        if source.version > self.document.version {
            self.document.version = source.version.clone();
        }
        self.document.max_id = self.document.max_id.max(source.max_id);
        self.document.objects.extend(source.objects);

        self.document
            .get_object_mut(source_pages_id)
            .and_then(|pages| pages.as_dict_mut())
            .map_err(|e| {
                PdfStitchError::merge_failed(format!("Source page tree root is invalid: {e}"))
            })?
            .set("Parent", self.pages_id);

        let root = self
            .document
            .get_object_mut(self.pages_id)
            .and_then(|pages| pages.as_dict_mut())
            .map_err(|e| PdfStitchError::merge_failed(format!("Failed to get pages object: {e}")))?;

        match root.get_mut(b"Kids") {
            Ok(Object::Array(kids)) => kids.push(Object::Reference(source_pages_id)),
            _ => return Err(PdfStitchError::merge_failed("Kids is not an array")),
        }

        self.page_count += page_count;
        root.set("Count", self.page_count as i64);

        tracing::trace!(pages = page_count, total = self.page_count, "appended pages");
        Ok(page_count)
    }

    /// Number of pages appended so far.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// The document built so far.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Finish and return the merged document.
    pub fn finish(self) -> Document {
        self.document
    }

    fn collides(&self, source: &Document) -> bool {
        source
            .objects
            .keys()
            .next()
            .is_some_and(|id| id.0 <= self.document.max_id)
    }
}

impl Default for PageAppender {
    fn default() -> Self {
        Self::new()
    }
}
