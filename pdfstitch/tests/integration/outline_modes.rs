//! Integration tests for the four outline modes.

use lopdf::{Document, Object};
use pdfstitch::config::{OutlineMode, SiblingLinks};
use pdfstitch::diagnostics::{DiagnosticKind, Diagnostics};
use pdfstitch::merge::{MergeOptions, MergeOutput, Merger, SourceDocument};
use rstest::rstest;

use crate::common::{Entry, PdfFixture, Target, group, item, read_outline, top_level};

fn merge(fixtures: &[(&str, PdfFixture)], options: MergeOptions) -> MergeOutput {
    let sources = fixtures
        .iter()
        .map(|(name, fixture)| SourceDocument::new(*name, fixture.build()))
        .collect();
    Merger::new()
        .merge_documents(sources, &options, Diagnostics::new())
        .unwrap()
}

fn options(outline_mode: OutlineMode) -> MergeOptions {
    MergeOptions {
        outline_mode,
        ..MergeOptions::default()
    }
}

/// Intro (named, 1 page) followed by a book with a nested outline (3 pages).
fn sources() -> Vec<(&'static str, PdfFixture)> {
    vec![
        (
            "intro.pdf",
            PdfFixture::new(1)
                .named("Intro", 0)
                .outline(vec![item("Intro", Target::Named("Intro"))]),
        ),
        (
            "book.pdf",
            PdfFixture::new(3).title("The Book").outline(vec![
                group(
                    "Part I",
                    Target::Page(0),
                    vec![item("Chapter 1", Target::Page(1))],
                ),
                item("Part II", Target::Page(2)),
            ]),
        ),
    ]
}

fn entry(title: &str, page: usize, children: Vec<Entry>) -> Entry {
    Entry {
        title: title.to_string(),
        page: Some(page),
        children,
    }
}

#[test]
fn test_round_trip_two_one_page_documents() {
    let fixtures = [
        (
            "a.pdf",
            PdfFixture::new(1)
                .named("Intro", 0)
                .outline(vec![item("Intro", Target::Named("Intro"))]),
        ),
        (
            "b.pdf",
            PdfFixture::new(1).outline(vec![item("Chapter 1", Target::Page(0))]),
        ),
    ];

    let output = merge(&fixtures, options(OutlineMode::RetainEntries));

    assert_eq!(output.document.get_pages().len(), 2);
    assert_eq!(
        top_level(&output.document),
        vec![
            ("Intro".to_string(), Some(0)),
            ("Chapter 1".to_string(), Some(1)),
        ]
    );
}

#[test]
fn test_documents_without_outlines_get_no_outline_entry() {
    let fixtures = [("a.pdf", PdfFixture::new(1)), ("b.pdf", PdfFixture::new(2))];

    let output = merge(&fixtures, options(OutlineMode::RetainEntries));

    let catalog = output.document.catalog().unwrap();
    assert!(!catalog.has(b"Outlines"));
    assert_eq!(output.statistics.outline_entries, 0);
}

#[test]
fn test_mode_none() {
    let output = merge(&sources(), options(OutlineMode::None));

    assert!(!output.document.catalog().unwrap().has(b"Outlines"));
    assert_eq!(output.document.get_pages().len(), 4);
}

#[test]
fn test_mode_one_entry_per_file() {
    let output = merge(&sources(), options(OutlineMode::OneEntryPerFile));

    assert_eq!(
        read_outline(&output.document),
        vec![
            entry("intro.pdf", 0, vec![]),
            entry("The Book", 1, vec![]),
        ]
    );
}

#[test]
fn test_mode_retain_entries() {
    let output = merge(&sources(), options(OutlineMode::RetainEntries));

    assert_eq!(
        read_outline(&output.document),
        vec![
            entry("Intro", 0, vec![]),
            entry("Part I", 1, vec![entry("Chapter 1", 2, vec![])]),
            entry("Part II", 3, vec![]),
        ]
    );
}

#[test]
fn test_mode_retain_as_one_entry() {
    let output = merge(&sources(), options(OutlineMode::RetainAsOneEntry));

    assert_eq!(
        read_outline(&output.document),
        vec![
            entry("intro.pdf", 0, vec![entry("Intro", 0, vec![])]),
            entry(
                "The Book",
                1,
                vec![
                    entry("Part I", 1, vec![entry("Chapter 1", 2, vec![])]),
                    entry("Part II", 3, vec![]),
                ]
            ),
        ]
    );
    assert_eq!(output.statistics.outline_entries, 6);
}

#[test]
fn test_unresolvable_entries_are_dropped_with_their_children() {
    let fixtures = [(
        "a.pdf",
        PdfFixture::new(2).outline(vec![
            item("Website", Target::Uri("https://example.com")),
            group(
                "Heading",
                Target::Nothing,
                vec![item("Under heading", Target::Page(1))],
            ),
            item("Missing", Target::Named("Nowhere")),
            item("Kept", Target::Page(1)),
        ]),
    )];

    let output = merge(&fixtures, options(OutlineMode::RetainEntries));

    assert_eq!(
        top_level(&output.document),
        vec![("Kept".to_string(), Some(1))]
    );
    assert_eq!(output.statistics.outline_entries, 1);
    assert_eq!(output.statistics.dropped_outline_entries, 4);

    let kinds: Vec<_> = output.diagnostics.iter().map(|d| &d.kind).collect();
    assert!(kinds
        .iter()
        .any(|k| matches!(k, DiagnosticKind::UnsupportedAction { action } if action == "URI")));
    assert!(kinds
        .iter()
        .any(|k| matches!(k, DiagnosticKind::UnknownNamedDestination { name } if name == "Nowhere")));
    assert!(kinds
        .iter()
        .any(|k| matches!(k, DiagnosticKind::DroppedOutlineEntry { descendants: 1 })));
}

#[test]
fn test_cyclic_outline_is_cut() {
    let mut doc = PdfFixture::new(1)
        .outline(vec![item("Loop", Target::Page(0))])
        .build();
    let root_id = doc
        .catalog()
        .unwrap()
        .get(b"Outlines")
        .unwrap()
        .as_reference()
        .unwrap();
    let first_id = doc
        .get_dictionary(root_id)
        .unwrap()
        .get(b"First")
        .unwrap()
        .as_reference()
        .unwrap();
    doc.get_dictionary_mut(first_id)
        .unwrap()
        .set("Next", Object::Reference(first_id));

    let output = Merger::new()
        .merge_documents(
            vec![SourceDocument::new("loop.pdf", doc)],
            &options(OutlineMode::RetainEntries),
            Diagnostics::new(),
        )
        .unwrap();

    assert_eq!(
        top_level(&output.document),
        vec![("Loop".to_string(), Some(0))]
    );
    assert!(output
        .diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::OutlineCycle));
}

fn top_level_items(doc: &Document) -> Vec<lopdf::Dictionary> {
    let root_id = doc
        .catalog()
        .unwrap()
        .get(b"Outlines")
        .unwrap()
        .as_reference()
        .unwrap();
    let root = doc.get_dictionary(root_id).unwrap();
    let mut items = Vec::new();
    let mut current = root.get(b"First").and_then(Object::as_reference).ok();
    while let Some(id) = current {
        let dict = doc.get_dictionary(id).unwrap().clone();
        current = dict.get(b"Next").and_then(Object::as_reference).ok();
        items.push(dict);
        if items.len() > 10 {
            break;
        }
    }
    items
}

#[rstest]
#[case(SiblingLinks::Compat, [false, false, true])]
#[case(SiblingLinks::Full, [false, true, true])]
fn test_sibling_link_styles(#[case] links: SiblingLinks, #[case] has_prev: [bool; 3]) {
    let fixtures = [
        ("a.pdf", PdfFixture::new(1)),
        ("b.pdf", PdfFixture::new(1)),
        ("c.pdf", PdfFixture::new(1)),
    ];
    let options = MergeOptions {
        outline_mode: OutlineMode::OneEntryPerFile,
        sibling_links: links,
        ..MergeOptions::default()
    };

    let output = merge(&fixtures, options);
    let items = top_level_items(&output.document);

    assert_eq!(items.len(), 3);
    let prev: Vec<_> = items.iter().map(|item| item.has(b"Prev")).collect();
    assert_eq!(prev, has_prev);
    assert!(items[0].has(b"Next"));
    assert!(items[1].has(b"Next"));
    assert!(!items[2].has(b"Next"));
}

#[test]
fn test_single_entry_links_to_itself() {
    let output = merge(
        &[("a.pdf", PdfFixture::new(1))],
        options(OutlineMode::OneEntryPerFile),
    );

    let root_id = output
        .document
        .catalog()
        .unwrap()
        .get(b"Outlines")
        .unwrap()
        .as_reference()
        .unwrap();
    let root = output.document.get_dictionary(root_id).unwrap();
    let first = root.get(b"First").unwrap().as_reference().unwrap();
    let last = root.get(b"Last").unwrap().as_reference().unwrap();
    assert_eq!(first, last);

    let only = output.document.get_dictionary(first).unwrap();
    assert_eq!(only.get(b"Prev").unwrap().as_reference().unwrap(), first);
}
