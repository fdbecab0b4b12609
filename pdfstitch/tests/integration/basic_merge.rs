//! Integration tests for merging files from disk.

use lopdf::Document;
use pdfstitch::config::{CompressionLevel, Config, Metadata, OutlineMode, OverwriteMode};
use pdfstitch::io::{PdfWriter, load_pdf};
use pdfstitch::merge::{Merger, merge_pdfs};
use tempfile::TempDir;

use crate::common::{PdfFixture, Target, item, temp_output_path, top_level};

fn config(inputs: Vec<std::path::PathBuf>) -> Config {
    Config {
        inputs,
        output: temp_output_path().to_path_buf(),
        overwrite_mode: OverwriteMode::Force,
        quiet: true,
        ..Config::default()
    }
}

#[tokio::test]
async fn test_merge_two_files() {
    let dir = TempDir::new().unwrap();
    let a = PdfFixture::new(2).write(dir.path(), "a.pdf");
    let b = PdfFixture::new(3).write(dir.path(), "b.pdf");

    let (doc, stats) = merge_pdfs(&config(vec![a, b])).await.unwrap();

    assert_eq!(stats.files_merged, 2);
    assert_eq!(stats.total_pages, 5);
    assert_eq!(doc.get_pages().len(), 5);
    assert!(stats.input_size > 0);
}

#[tokio::test]
async fn test_merge_single_file() {
    let dir = TempDir::new().unwrap();
    let a = PdfFixture::new(4).write(dir.path(), "a.pdf");

    let (doc, stats) = merge_pdfs(&config(vec![a])).await.unwrap();

    assert_eq!(stats.files_merged, 1);
    assert_eq!(doc.get_pages().len(), 4);
}

#[tokio::test]
async fn test_save_and_reload() {
    let dir = TempDir::new().unwrap();
    let a = PdfFixture::new(1)
        .outline(vec![item("Cover", Target::Page(0))])
        .write(dir.path(), "a.pdf");
    let b = PdfFixture::new(2)
        .outline(vec![item("Body", Target::Page(1))])
        .write(dir.path(), "b.pdf");
    let output = dir.path().join("merged.pdf");

    let config = Config {
        outline_mode: OutlineMode::RetainEntries,
        output: output.clone(),
        ..config(vec![a, b])
    };
    let merged = Merger::new().merge(&config).await.unwrap();
    PdfWriter::new().save(merged.document, &output).await.unwrap();

    let reloaded = load_pdf(&output).await.unwrap();
    assert_eq!(reloaded.get_pages().len(), 3);
    assert_eq!(
        top_level(&reloaded),
        vec![
            ("Cover".to_string(), Some(0)),
            ("Body".to_string(), Some(2)),
        ]
    );
}

#[tokio::test]
async fn test_parallel_load_keeps_input_order() {
    let dir = TempDir::new().unwrap();
    let inputs: Vec<_> = (1..=6)
        .map(|n| PdfFixture::new(n).write(dir.path(), &format!("part{n}.pdf")))
        .collect();

    let config = Config {
        jobs: Some(4),
        outline_mode: OutlineMode::OneEntryPerFile,
        ..config(inputs)
    };
    let output = Merger::new().merge(&config).await.unwrap();

    let starts: Vec<_> = output.sources.iter().map(|s| s.start_page).collect();
    assert_eq!(starts, vec![0, 1, 3, 6, 10, 15]);
    assert_eq!(output.statistics.total_pages, 21);

    let pages: Vec<_> = top_level(&output.document)
        .into_iter()
        .map(|(_, page)| page)
        .collect();
    assert_eq!(
        pages,
        vec![Some(0), Some(1), Some(3), Some(6), Some(10), Some(15)]
    );
}

#[tokio::test]
async fn test_metadata_is_written() {
    let dir = TempDir::new().unwrap();
    let a = PdfFixture::new(1).write(dir.path(), "a.pdf");

    let config = Config {
        metadata: Metadata::new(
            Some("Collected Papers".to_string()),
            Some("Editor".to_string()),
            None,
            None,
        ),
        ..config(vec![a])
    };
    let (mut doc, _) = merge_pdfs(&config).await.unwrap();

    let bytes = PdfWriter::to_bytes(&mut doc).unwrap();
    let reloaded = Document::load_mem(&bytes).unwrap();
    let info_id = reloaded
        .trailer
        .get(b"Info")
        .and_then(|info| info.as_reference())
        .unwrap();
    let info = reloaded.get_dictionary(info_id).unwrap();
    assert!(info.has(b"Title"));
    assert!(info.has(b"Author"));
    assert!(info.has(b"Producer"));
}

#[tokio::test]
async fn test_compression_levels() {
    let dir = TempDir::new().unwrap();
    let a = PdfFixture::new(2).write(dir.path(), "a.pdf");

    for level in [
        CompressionLevel::None,
        CompressionLevel::Standard,
        CompressionLevel::Maximum,
    ] {
        let config = Config {
            compression: level,
            ..config(vec![a.clone()])
        };
        let (doc, stats) = merge_pdfs(&config).await.unwrap();

        assert_eq!(doc.get_pages().len(), 2);
        assert_eq!(stats.compressed, level != CompressionLevel::None);
    }
}
