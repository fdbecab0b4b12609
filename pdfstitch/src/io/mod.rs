//! I/O operations for pdfstitch.
//!
//! This module handles all file I/O operations including:
//! - Loading PDF documents from disk or memory
//! - Writing merged PDFs to disk or memory
//! - Parallel PDF loading
//!
//! # Examples
//!
//! ```no_run
//! use pdfstitch::io::{PdfReader, PdfWriter};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let loaded = reader.load(&PathBuf::from("input.pdf")).await?;
//!
//! let writer = PdfWriter::new();
//! writer.save(loaded.document, &PathBuf::from("output.pdf")).await?;
//! # Ok(())
//! # }
//! ```

pub mod reader;
pub mod writer;

pub use reader::{LoadResult, LoadStatistics, LoadedPdf, PdfReader};
pub use writer::{PdfWriter, WriteOptions, WriteStatistics};

use crate::error::Result;
use lopdf::Document;
use std::path::Path;

/// Load a PDF document from a file.
///
/// Convenience function for loading a single PDF.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid PDF.
pub async fn load_pdf(path: &Path) -> Result<Document> {
    let loaded = PdfReader::new().load(path).await?;
    Ok(loaded.document)
}

/// Save a PDF document to a file atomically.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub async fn save_pdf(doc: Document, path: &Path) -> Result<()> {
    PdfWriter::new().save(doc, path).await
}
