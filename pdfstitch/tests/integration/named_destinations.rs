//! Integration tests for named destinations.

use lopdf::Document;
use pdfstitch::config::OutlineMode;
use pdfstitch::diagnostics::{DiagnosticKind, Diagnostics};
use pdfstitch::merge::{MergeOptions, Merger, SourceDocument, merge_bytes};
use std::sync::{Arc, Mutex};

use crate::common::{PdfFixture, Target, item, named_page, top_level};

fn retain_entries() -> MergeOptions {
    MergeOptions {
        outline_mode: OutlineMode::RetainEntries,
        ..MergeOptions::default()
    }
}

#[test]
fn test_named_destinations_are_carried_over() {
    let a = PdfFixture::new(1).named("Intro", 0);
    let b = PdfFixture::new(2).named("Appendix", 1);

    let output = Merger::new()
        .merge_documents(
            vec![
                SourceDocument::new("a.pdf", a.build()),
                SourceDocument::new("b.pdf", b.build()),
            ],
            &retain_entries(),
            Diagnostics::new(),
        )
        .unwrap();

    assert_eq!(output.statistics.named_destinations, 2);
    assert_eq!(named_page(&output.document, "Intro"), Some(0));
    assert_eq!(named_page(&output.document, "Appendix"), Some(2));
}

#[test]
fn test_duplicate_names_keep_the_first_document() {
    let a = PdfFixture::new(1).named("Top", 0);
    let b = PdfFixture::new(1).named("Top", 0);

    let output = Merger::new()
        .merge_documents(
            vec![
                SourceDocument::new("a.pdf", a.build()),
                SourceDocument::new("b.pdf", b.build()),
            ],
            &retain_entries(),
            Diagnostics::new(),
        )
        .unwrap();

    assert_eq!(named_page(&output.document, "Top"), Some(0));
    let duplicate = output
        .diagnostics
        .iter()
        .find(|d| matches!(&d.kind, DiagnosticKind::DuplicateNamedDestination { name } if name == "Top"))
        .expect("duplicate reported");
    assert_eq!(duplicate.source.as_deref(), Some("b.pdf"));
}

#[test]
fn test_carry_over_can_be_disabled() {
    let a = PdfFixture::new(1)
        .named("Intro", 0)
        .outline(vec![item("Intro", Target::Named("Intro"))]);

    let options = MergeOptions {
        keep_named_destinations: false,
        ..retain_entries()
    };
    let output = Merger::new()
        .merge_documents(
            vec![SourceDocument::new("a.pdf", a.build())],
            &options,
            Diagnostics::new(),
        )
        .unwrap();

    // the outline entry was resolved before the names were discarded
    assert_eq!(
        top_level(&output.document),
        vec![("Intro".to_string(), Some(0))]
    );
    assert_eq!(output.statistics.named_destinations, 0);
    assert!(!output.document.catalog().unwrap().has(b"Names"));
}

#[test]
fn test_parenthesized_keys_resolve() {
    let a = PdfFixture::new(2)
        .named("(Foo)", 1)
        .outline(vec![item("Foo", Target::Named("Foo"))]);

    let output = Merger::new()
        .merge_documents(
            vec![SourceDocument::new("a.pdf", a.build())],
            &retain_entries(),
            Diagnostics::new(),
        )
        .unwrap();

    assert_eq!(
        top_level(&output.document),
        vec![("Foo".to_string(), Some(1))]
    );
}

#[test]
fn test_named_entries_in_later_documents_are_offset() {
    let a = PdfFixture::new(3);
    let b = PdfFixture::new(2)
        .named("Results", 1)
        .outline(vec![item("Results", Target::Named("Results"))]);

    let merged = merge_bytes(
        vec![
            ("a.pdf".to_string(), a.bytes()),
            ("b.pdf".to_string(), b.bytes()),
        ],
        &retain_entries(),
    )
    .unwrap();

    let doc = Document::load_mem(&merged).unwrap();
    assert_eq!(top_level(&doc), vec![("Results".to_string(), Some(4))]);
    assert_eq!(named_page(&doc, "Results"), Some(4));
}

#[test]
fn test_missing_name_tree_is_informational() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let diagnostics = Diagnostics::with_callback(move |d| {
        sink.lock().unwrap().push(d.kind.clone());
    });

    let a = PdfFixture::new(1).outline(vec![item("Start", Target::Page(0))]);
    let output = Merger::new()
        .merge_documents(
            vec![SourceDocument::new("a.pdf", a.build())],
            &retain_entries(),
            diagnostics,
        )
        .unwrap();

    assert!(seen
        .lock()
        .unwrap()
        .contains(&DiagnosticKind::MissingNamedDestinations));
    assert_eq!(output.diagnostics.len(), seen.lock().unwrap().len());
    assert!(output
        .diagnostics
        .iter()
        .all(|d| d.severity == pdfstitch::diagnostics::Severity::Info));
}
