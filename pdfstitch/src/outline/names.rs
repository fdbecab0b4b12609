//! Named destinations.
//!
//! A document can publish destinations by name in two places: the
//! `/Names/Dests` name tree (PDF 1.2+, string keys) and the older catalog
//! `/Dests` dictionary (name keys). [`NamedDestinationIndex`] flattens both
//! into a map used to resolve `GoTo` actions while merging outlines.
//! [`NamedDestinationCarryOver`] collects the same entries from every source
//! so that links inside the copied pages keep working in the merged file.

use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};
use std::collections::{BTreeMap, HashMap, HashSet};

use super::{PageTable, deref, get_deref};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{PdfStitchError, Result};
use crate::utils::text::decode_text;

/// Name trees nested deeper than this are not followed.
const MAX_NAME_TREE_DEPTH: usize = 64;

/// A destination published under a name.
#[derive(Debug, Clone)]
pub struct NamedDestination {
    /// Destination dictionary; its `/D` entry holds the explicit destination.
    pub entry: Dictionary,
    /// Zero-based page in the owning document, if `/D` points at one of its pages.
    pub page: Option<usize>,
}

/// Name to destination map for one document.
#[derive(Debug, Clone, Default)]
pub struct NamedDestinationIndex {
    entries: HashMap<String, NamedDestination>,
}

impl NamedDestinationIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every named destination of `doc`.
    ///
    /// A document without named destinations yields an empty index and an
    /// informational diagnostic. Entries whose page cannot be determined are
    /// kept with `page: None`. When a name appears more than once, the first
    /// occurrence wins; name-tree entries are read before legacy `/Dests`.
    pub fn build(doc: &Document, pages: &PageTable, diagnostics: &mut Diagnostics) -> Self {
        let mut index = Self::new();

        let raw = collect_raw(doc);
        if raw.tree.is_empty() && raw.legacy.is_empty() {
            diagnostics.info(
                DiagnosticKind::MissingNamedDestinations,
                "document has no named destinations",
            );
            return index;
        }

        for (key, entry) in raw.tree.into_iter().chain(raw.legacy) {
            let name = decode_text(&key);
            if index.entries.contains_key(&name) {
                continue;
            }
            let page = destination_page(doc, &entry, pages);
            index.entries.insert(name, NamedDestination { entry, page });
        }

        tracing::debug!(count = index.len(), "indexed named destinations");
        index
    }

    /// Insert or replace an entry, returning the previous one.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        destination: NamedDestination,
    ) -> Option<NamedDestination> {
        self.entries.insert(name.into(), destination)
    }

    /// Exact lookup.
    pub fn get(&self, name: &str) -> Option<&NamedDestination> {
        self.entries.get(name)
    }

    /// Lookup tolerant of the two key spellings seen in real files.
    ///
    /// Tries the name as given, then wrapped in parentheses (`Foo` finds a
    /// key stored as `(Foo)`), then with surrounding parentheses removed.
    pub fn lookup(&self, name: &str) -> Option<&NamedDestination> {
        self.get(name)
            .or_else(|| self.get(&format!("({name})")))
            .or_else(|| {
                name.strip_prefix('(')
                    .and_then(|n| n.strip_suffix(')'))
                    .and_then(|n| self.get(n))
            })
    }

    /// Number of indexed names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, destination)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NamedDestination)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Named destinations gathered from several documents, ready to be written
/// into the merged catalog.
///
/// Feed documents after their objects have been renumbered for the merged
/// document, so the page references inside each entry stay valid.
#[derive(Debug, Default)]
pub struct NamedDestinationCarryOver {
    tree: BTreeMap<Vec<u8>, Dictionary>,
    legacy: BTreeMap<Vec<u8>, Dictionary>,
}

impl NamedDestinationCarryOver {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the named destinations of `doc`, returning how many were added.
    ///
    /// A name already collected from an earlier document is kept and the new
    /// one is reported as a duplicate.
    pub fn absorb(&mut self, doc: &Document, diagnostics: &mut Diagnostics) -> usize {
        let raw = collect_raw(doc);
        let mut added = 0;

        for (store, entries) in [(&mut self.tree, raw.tree), (&mut self.legacy, raw.legacy)] {
            for (key, entry) in entries {
                if store.contains_key(&key) {
                    let name = decode_text(&key);
                    diagnostics.warn(
                        DiagnosticKind::DuplicateNamedDestination { name: name.clone() },
                        format!("named destination '{name}' already defined by an earlier document"),
                    );
                    continue;
                }
                store.insert(key, entry);
                added += 1;
            }
        }

        added
    }

    /// Total number of collected names.
    pub fn len(&self) -> usize {
        self.tree.len() + self.legacy.len()
    }

    /// Whether nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty() && self.legacy.is_empty()
    }

    /// Write the collected names into `doc`'s catalog.
    ///
    /// Name-tree entries become a single-leaf `/Names/Dests` tree with keys in
    /// byte order. Legacy entries become the catalog `/Dests` dictionary.
    /// Returns the number of names written.
    pub fn write(self, doc: &mut Document) -> Result<usize> {
        let written = self.len();
        if written == 0 {
            return Ok(0);
        }

        let tree_id = if self.tree.is_empty() {
            None
        } else {
            let mut names = Vec::with_capacity(self.tree.len() * 2);
            let mut keys = self.tree.keys();
            let lowest = keys.next().cloned();
            let highest = keys.next_back().cloned().or_else(|| lowest.clone());

            for (key, entry) in self.tree {
                names.push(Object::string_literal(key));
                names.push(Object::Dictionary(entry));
            }

            let mut leaf = dictionary! { "Names" => names };
            if let (Some(lowest), Some(highest)) = (lowest, highest) {
                leaf.set(
                    "Limits",
                    vec![Object::string_literal(lowest), Object::string_literal(highest)],
                );
            }
            Some(doc.add_object(leaf))
        };

        let legacy_id = if self.legacy.is_empty() {
            None
        } else {
            let mut dests = Dictionary::new();
            for (key, entry) in self.legacy {
                dests.set(key, Object::Dictionary(entry));
            }
            Some(doc.add_object(dests))
        };

        let catalog = doc.catalog_mut().map_err(|e| {
            PdfStitchError::merge_failed(format!("Failed to get catalog: {e}"))
        })?;
        if let Some(tree_id) = tree_id {
            catalog.set("Names", dictionary! { "Dests" => tree_id });
        }
        if let Some(legacy_id) = legacy_id {
            catalog.set("Dests", legacy_id);
        }

        Ok(written)
    }
}

/// Number of distinct names `doc` defines in its name tree and legacy
/// `/Dests`.
pub fn count_named_destinations(doc: &Document) -> usize {
    let raw = collect_raw(doc);
    raw.tree
        .iter()
        .chain(&raw.legacy)
        .map(|(key, _)| decode_text(key))
        .collect::<HashSet<_>>()
        .len()
}

/// Raw keys and normalized destination dictionaries, in document order.
struct RawNamedDestinations {
    tree: Vec<(Vec<u8>, Dictionary)>,
    legacy: Vec<(Vec<u8>, Dictionary)>,
}

fn collect_raw(doc: &Document) -> RawNamedDestinations {
    let mut raw = RawNamedDestinations {
        tree: Vec::new(),
        legacy: Vec::new(),
    };

    let Ok(catalog) = doc.catalog() else {
        return raw;
    };

    if let Some(dests) = get_deref(doc, catalog, b"Names")
        .and_then(|names| names.as_dict().ok())
        .and_then(|names| names.get(b"Dests").ok())
    {
        let mut visited = HashSet::new();
        walk_name_tree(doc, dests, 0, &mut visited, &mut raw.tree);
    }

    if let Some(Ok(legacy)) = get_deref(doc, catalog, b"Dests").map(Object::as_dict) {
        for (key, value) in legacy.iter() {
            if let Some(entry) = normalize_destination(doc, value) {
                raw.legacy.push((key.clone(), entry));
            }
        }
    }

    raw
}

/// Flatten a name tree node. Internal nodes carry `/Kids`, leaves carry
/// `/Names` as alternating key/value pairs.
fn walk_name_tree(
    doc: &Document,
    node: &Object,
    depth: usize,
    visited: &mut HashSet<ObjectId>,
    out: &mut Vec<(Vec<u8>, Dictionary)>,
) {
    if depth > MAX_NAME_TREE_DEPTH {
        tracing::warn!(depth, "name tree too deep, ignoring the rest");
        return;
    }
    if let Object::Reference(id) = node
        && !visited.insert(*id)
    {
        return;
    }
    let Ok(Ok(dict)) = deref(doc, node).map(Object::as_dict) else {
        return;
    };

    if let Some(Ok(kids)) = get_deref(doc, dict, b"Kids").map(Object::as_array) {
        for kid in kids {
            walk_name_tree(doc, kid, depth + 1, visited, out);
        }
    }

    if let Some(Ok(names)) = get_deref(doc, dict, b"Names").map(Object::as_array) {
        for pair in names.chunks_exact(2) {
            let key = match deref(doc, &pair[0]) {
                Ok(Object::String(bytes, _)) => bytes.clone(),
                _ => continue,
            };
            if let Some(entry) = normalize_destination(doc, &pair[1]) {
                out.push((key, entry));
            }
        }
    }
}

/// Bring a name-tree value into `<< /D [...] >>` form.
///
/// Values may be a destination dictionary or a bare destination array, either
/// of them indirect. An indirect `/D` is replaced by the array it points to.
fn normalize_destination(doc: &Document, value: &Object) -> Option<Dictionary> {
    match deref(doc, value).ok()? {
        Object::Array(array) => Some(dictionary! { "D" => array.clone() }),
        Object::Dictionary(dict) => {
            let mut entry = dict.clone();
            if let Some(d @ Object::Array(_)) = get_deref(doc, dict, b"D") {
                entry.set("D", d.clone());
            }
            Some(entry)
        }
        _ => None,
    }
}

/// Page of the explicit destination held in an entry's `/D`.
fn destination_page(doc: &Document, entry: &Dictionary, pages: &PageTable) -> Option<usize> {
    let array = get_deref(doc, entry, b"D")?.as_array().ok()?;
    match array.first()? {
        Object::Reference(id) => pages.index_of(*id),
        _ => None,
    }
}
