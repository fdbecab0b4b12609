//! Integration tests for error handling and edge cases.

use pdfstitch::config::{Config, OverwriteMode};
use pdfstitch::error::PdfStitchError;
use pdfstitch::io::PdfWriter;
use pdfstitch::merge::merge_pdfs;
use rstest::rstest;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::common::{PdfFixture, temp_output_path};

fn config(inputs: Vec<PathBuf>) -> Config {
    Config {
        inputs,
        output: temp_output_path().to_path_buf(),
        overwrite_mode: OverwriteMode::Force,
        quiet: true,
        ..Config::default()
    }
}

#[tokio::test]
async fn test_nonexistent_input() {
    let err = merge_pdfs(&config(vec![PathBuf::from("/nonexistent/file.pdf")]))
        .await
        .unwrap_err();

    assert!(matches!(err, PdfStitchError::FileNotFound { .. }));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_one_bad_input_fails_the_merge() {
    let dir = TempDir::new().unwrap();
    let good = PdfFixture::new(1).write(dir.path(), "good.pdf");
    let bad = dir.path().join("bad.pdf");
    std::fs::write(&bad, b"%PDF-1.7\nthis is not a pdf").unwrap();

    let err = merge_pdfs(&config(vec![good, bad])).await.unwrap_err();

    assert!(matches!(err, PdfStitchError::FailedToLoadPdf { .. }));
    assert_eq!(err.exit_code(), 3);
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_directory_as_input() {
    let dir = TempDir::new().unwrap();

    let err = merge_pdfs(&config(vec![dir.path().to_path_buf()]))
        .await
        .unwrap_err();

    assert!(matches!(err, PdfStitchError::NotAFile { .. }));
}

#[tokio::test]
async fn test_empty_input_list() {
    let config = config(vec![]);

    assert!(config.validate().is_err());
    let err = merge_pdfs(&config).await.unwrap_err();
    assert!(matches!(err, PdfStitchError::NoFilesToMerge));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_output_same_as_input() {
    let mut config = config(vec![PathBuf::from("a.pdf")]);
    config.output = PathBuf::from("a.pdf");

    assert!(config.validate().is_err());
}

#[tokio::test]
async fn test_failed_save_leaves_no_output() {
    let dir = TempDir::new().unwrap();
    let input = PdfFixture::new(1).write(dir.path(), "a.pdf");
    let output = dir.path().join("missing").join("merged.pdf");

    let (doc, _) = merge_pdfs(&config(vec![input])).await.unwrap();
    let err = PdfWriter::new().save(doc, &output).await.unwrap_err();

    assert_eq!(err.exit_code(), 5);
    assert!(!output.exists());
    assert!(!dir.path().join("missing").join("merged.pdf.tmp").exists());
}

#[rstest]
#[case(PdfStitchError::output_exists(PathBuf::from("o.pdf")), 4)]
#[case(PdfStitchError::invalid_config("bad"), 1)]
#[case(PdfStitchError::outline_failed("no catalog"), 6)]
#[case(PdfStitchError::Cancelled, 130)]
fn test_exit_codes(#[case] err: PdfStitchError, #[case] code: i32) {
    assert_eq!(err.exit_code(), code);
}
