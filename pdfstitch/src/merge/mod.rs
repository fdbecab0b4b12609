//! PDF merging operations.
//!
//! This module concatenates documents and carries their outlines over:
//! - Page tree grafting in input order
//! - Outline combination in four modes
//! - Named destination carry-over
//! - Metadata for the merged document
//!
//! # Examples
//!
//! ```no_run
//! use pdfstitch::merge::Merger;
//! use pdfstitch::config::{Config, OutlineMode};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     inputs: vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")],
//!     output: PathBuf::from("merged.pdf"),
//!     outline_mode: OutlineMode::RetainEntries,
//!     ..Config::default()
//! };
//!
//! let output = Merger::new().merge(&config).await?;
//! println!("Merged {} pages", output.statistics.total_pages);
//! # Ok(())
//! # }
//! ```

pub mod merger;
pub mod metadata;
pub mod pages;

pub use merger::{
    MergeOptions, MergeOutput, MergePlan, MergeState, MergeStatistics, Merger, SourceDocument,
    SourceSummary,
};
pub use metadata::MetadataManager;
pub use pages::PageAppender;

use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::io::{PdfReader, PdfWriter};
use lopdf::Document;

/// Merge the PDF files named by `config`.
///
/// Convenience function that creates a merger and performs the merge.
///
/// # Errors
///
/// Returns an error if any input fails to load or the merge fails.
///
/// # Examples
///
/// ```no_run
/// use pdfstitch::merge::merge_pdfs;
/// use pdfstitch::config::Config;
///
/// # async fn example(config: Config) -> Result<(), Box<dyn std::error::Error>> {
/// let (document, stats) = merge_pdfs(&config).await?;
/// println!("Created {} page document", stats.total_pages);
/// # Ok(())
/// # }
/// ```
pub async fn merge_pdfs(config: &Config) -> Result<(Document, MergeStatistics)> {
    let merger = Merger::new();
    let output = merger.merge(config).await?;
    Ok((output.document, output.statistics))
}

/// Merge PDFs held in memory and serialize the result.
///
/// Each input is a `(name, bytes)` pair; the name titles the document's
/// outline entry when the document has no title of its own.
///
/// # Errors
///
/// Returns an error if an input cannot be parsed, the list is empty, or the
/// merged document cannot be serialized.
pub fn merge_bytes(inputs: Vec<(String, Vec<u8>)>, options: &MergeOptions) -> Result<Vec<u8>> {
    let reader = PdfReader::new();
    let sources = inputs
        .into_iter()
        .map(|(name, bytes)| {
            let document = reader.parse_bytes(&name, &bytes)?;
            Ok(SourceDocument::new(name, document))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut output = Merger::new().merge_documents(sources, options, Diagnostics::new())?;
    PdfWriter::to_bytes(&mut output.document)
}
