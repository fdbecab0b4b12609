//! pdfstitch - Merge PDF files and carry their outlines across.
//!
//! Documents are concatenated in order. Their bookmark trees are read,
//! every entry is resolved to a page of the merged document, and a new
//! outline is written according to one of four modes:
//!
//! - `none`: no outline
//! - `one-entry-per-file`: one top-level entry per input
//! - `retain-entries`: all inputs' entries side by side at the top level
//! - `retain-as-one-entry`: one entry per input with its outline below
//!
//! Named destinations are resolved through `/Names/Dests` (and the legacy
//! catalog `/Dests`) and re-published in the merged document so internal
//! links keep working. Problems inside outlines never abort a merge; they are
//! collected as [`diagnostics`].
//!
//! # Examples
//!
//! ## Merging files
//!
//! ```no_run
//! use pdfstitch::config::{Config, OutlineMode};
//! use pdfstitch::io::PdfWriter;
//! use pdfstitch::merge::Merger;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     inputs: vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")],
//!     output: PathBuf::from("merged.pdf"),
//!     outline_mode: OutlineMode::RetainAsOneEntry,
//!     ..Config::default()
//! };
//!
//! let output = Merger::new().merge(&config).await?;
//! for diagnostic in &output.diagnostics {
//!     eprintln!("{diagnostic}");
//! }
//! PdfWriter::new().save(output.document, &config.output).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Merging in memory
//!
//! ```no_run
//! use pdfstitch::merge::{merge_bytes, MergeOptions};
//!
//! # fn example(a: Vec<u8>, b: Vec<u8>) -> pdfstitch::Result<()> {
//! let merged = merge_bytes(
//!     vec![("a.pdf".to_string(), a), ("b.pdf".to_string(), b)],
//!     &MergeOptions::default(),
//! )?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod io;
pub mod merge;
pub mod outline;
pub mod output;
pub mod report;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{PdfStitchError, Result};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
