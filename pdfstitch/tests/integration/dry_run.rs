//! Integration tests for merge planning.

use pdfstitch::config::Config;
use pdfstitch::merge::Merger;
use pdfstitch::output::describe_source;
use tempfile::TempDir;

use crate::common::{PdfFixture, Target, group, item};

#[tokio::test]
async fn test_plan_describes_every_source() {
    let dir = TempDir::new().unwrap();
    let a = PdfFixture::new(2)
        .named("Intro", 0)
        .write(dir.path(), "a.pdf");
    let b = PdfFixture::new(3)
        .outline(vec![group(
            "Part",
            Target::Page(0),
            vec![item("Chapter", Target::Page(2))],
        )])
        .write(dir.path(), "b.pdf");
    let output = dir.path().join("merged.pdf");

    let config = Config {
        inputs: vec![a, b],
        output: output.clone(),
        dry_run: true,
        ..Config::default()
    };
    let plan = Merger::new().plan(&config).await.unwrap();

    assert_eq!(plan.total_pages, 5);
    assert_eq!(plan.sources.len(), 2);

    let first = &plan.sources[0];
    assert_eq!(first.name, "a.pdf");
    assert_eq!((first.start_page, first.page_count), (0, 2));
    assert!(!first.has_outline);
    assert_eq!(first.named_destinations, 1);

    let second = &plan.sources[1];
    assert_eq!((second.start_page, second.page_count), (2, 3));
    assert!(second.has_outline);
    assert_eq!(second.outline_entries, 2);
    assert_eq!(
        describe_source(second),
        "b.pdf (pages 3-5), 2 outline entries"
    );

    assert!(!output.exists(), "planning must not write output");
}

#[tokio::test]
async fn test_plan_fails_on_missing_input() {
    let config = Config {
        inputs: vec![std::path::PathBuf::from("/nonexistent/a.pdf")],
        dry_run: true,
        ..Config::default()
    };

    assert!(Merger::new().plan(&config).await.is_err());
}
