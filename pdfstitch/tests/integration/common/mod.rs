//! Shared helpers for the integration tests.
//!
//! Fixtures are generated in memory with `lopdf` instead of being checked in,
//! so every test states exactly which outline and name-tree shapes it uses.

#![allow(dead_code)]

use lopdf::{Document, Object, ObjectId, StringFormat, dictionary};
use pdfstitch::diagnostics::Diagnostics;
use pdfstitch::outline::{NamedDestinationIndex, PageTable, annotate, parse_outline};
use std::path::{Path, PathBuf};

/// Where a fixture outline item points.
#[derive(Debug, Clone)]
pub enum Target {
    /// Explicit `/Dest [page /XYZ null null null]`.
    Page(usize),
    /// `/A << /S /GoTo /D (name) >>`.
    Named(&'static str),
    /// `/A << /S /URI >>`, which has no page.
    Uri(&'static str),
    /// No destination at all.
    Nothing,
}

/// One fixture outline item with optional children.
#[derive(Debug, Clone)]
pub struct Item {
    pub title: &'static str,
    pub target: Target,
    pub children: Vec<Item>,
}

/// Leaf item.
pub fn item(title: &'static str, target: Target) -> Item {
    Item {
        title,
        target,
        children: Vec::new(),
    }
}

/// Item with children.
pub fn group(title: &'static str, target: Target, children: Vec<Item>) -> Item {
    Item {
        title,
        target,
        children,
    }
}

/// Builder for a small source PDF.
#[derive(Debug, Clone, Default)]
pub struct PdfFixture {
    pages: usize,
    title: Option<&'static str>,
    outline: Option<Vec<Item>>,
    named: Vec<(&'static str, usize)>,
}

impl PdfFixture {
    pub fn new(pages: usize) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }

    /// Set the `/Info` title.
    pub fn title(mut self, title: &'static str) -> Self {
        self.title = Some(title);
        self
    }

    /// Install an outline with these top-level items.
    pub fn outline(mut self, items: Vec<Item>) -> Self {
        self.outline = Some(items);
        self
    }

    /// Publish `name` in `/Names/Dests`, pointing at `page`.
    pub fn named(mut self, name: &'static str, page: usize) -> Self {
        self.named.push((name, page));
        self
    }

    pub fn build(&self) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let page_ids: Vec<ObjectId> = (0..self.pages)
            .map(|_| {
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
                })
            })
            .collect();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
                "Count" => self.pages as i64,
            }),
        );

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        };

        if !self.named.is_empty() {
            let mut names = Vec::new();
            for (name, page) in &self.named {
                names.push(literal(name));
                names.push(Object::Dictionary(dictionary! {
                    "D" => explicit(page_ids[*page]),
                }));
            }
            let leaf = doc.add_object(dictionary! { "Names" => names });
            catalog.set("Names", dictionary! { "Dests" => leaf });
        }

        if let Some(items) = &self.outline {
            let root_id = doc.new_object_id();
            let (first, last) = write_items(&mut doc, items, root_id, &page_ids);
            let mut root = dictionary! { "Type" => "Outlines" };
            if let (Some(first), Some(last)) = (first, last) {
                root.set("First", first);
                root.set("Last", last);
                root.set("Count", items.len() as i64);
            }
            doc.objects.insert(root_id, Object::Dictionary(root));
            catalog.set("Outlines", root_id);
        }

        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", catalog_id);

        if let Some(title) = self.title {
            let info = doc.add_object(dictionary! { "Title" => literal(title) });
            doc.trailer.set("Info", info);
        }

        doc
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        self.build()
            .save_to(&mut bytes)
            .expect("fixture serializes");
        bytes
    }

    /// Write the fixture to `dir/name`.
    pub fn write(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, self.bytes()).expect("fixture is written");
        path
    }
}

fn write_items(
    doc: &mut Document,
    items: &[Item],
    parent: ObjectId,
    page_ids: &[ObjectId],
) -> (Option<ObjectId>, Option<ObjectId>) {
    let ids: Vec<ObjectId> = items.iter().map(|_| doc.new_object_id()).collect();

    for (i, item) in items.iter().enumerate() {
        let mut dict = dictionary! {
            "Title" => literal(item.title),
            "Parent" => parent,
        };
        if i + 1 < ids.len() {
            dict.set("Next", ids[i + 1]);
        }
        if i > 0 {
            dict.set("Prev", ids[i - 1]);
        }
        match &item.target {
            Target::Page(page) => dict.set("Dest", explicit(page_ids[*page])),
            Target::Named(name) => dict.set(
                "A",
                dictionary! { "S" => "GoTo", "D" => literal(name) },
            ),
            Target::Uri(uri) => dict.set(
                "A",
                dictionary! { "S" => "URI", "URI" => literal(uri) },
            ),
            Target::Nothing => {}
        }
        let (first, last) = write_items(doc, &item.children, ids[i], page_ids);
        if let (Some(first), Some(last)) = (first, last) {
            dict.set("First", first);
            dict.set("Last", last);
            dict.set("Count", item.children.len() as i64);
        }
        doc.objects.insert(ids[i], Object::Dictionary(dict));
    }

    (ids.first().copied(), ids.last().copied())
}

fn literal(s: &str) -> Object {
    Object::String(s.as_bytes().to_vec(), StringFormat::Literal)
}

fn explicit(page: ObjectId) -> Object {
    Object::Array(vec![
        Object::Reference(page),
        Object::Name(b"XYZ".to_vec()),
        Object::Null,
        Object::Null,
        Object::Null,
    ])
}

/// A merged outline entry as `(title, page, children)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub title: String,
    pub page: Option<usize>,
    pub children: Vec<Entry>,
}

/// Read back the outline of a merged document with resolved pages.
pub fn read_outline(doc: &Document) -> Vec<Entry> {
    let mut diagnostics = Diagnostics::new();
    let pages = PageTable::from_document(doc);
    let index = NamedDestinationIndex::build(doc, &pages, &mut diagnostics);
    let tree = annotate(parse_outline(doc, &mut diagnostics), 0, &pages, &index, &mut diagnostics);

    fn convert(nodes: Vec<pdfstitch::outline::OutlineNode>) -> Vec<Entry> {
        nodes
            .into_iter()
            .map(|node| Entry {
                title: node.title.unwrap_or_default(),
                page: node.page,
                children: convert(node.children),
            })
            .collect()
    }

    convert(tree)
}

/// `(title, page)` of the top level only.
pub fn top_level(doc: &Document) -> Vec<(String, Option<usize>)> {
    read_outline(doc)
        .into_iter()
        .map(|entry| (entry.title, entry.page))
        .collect()
}

/// Page a named destination of `doc` points at.
pub fn named_page(doc: &Document, name: &str) -> Option<usize> {
    let pages = PageTable::from_document(doc);
    let index = NamedDestinationIndex::build(doc, &pages, &mut Diagnostics::new());
    index.lookup(name).and_then(|dest| dest.page)
}

/// Create a temporary output path for test results.
pub fn temp_output_path() -> tempfile::TempPath {
    tempfile::NamedTempFile::new()
        .expect("Failed to create temp file")
        .into_temp_path()
}
