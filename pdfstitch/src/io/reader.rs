//! PDF reading and loading operations.
//!
//! This module provides PDF loading with support for:
//! - Sequential and bounded-parallel loading that keeps input order
//! - Parsing on the blocking thread pool
//! - Detailed load statistics
//!
//! # Examples
//!
//! ```no_run
//! use pdfstitch::io::reader::PdfReader;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let paths = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
//! let (results, stats) = reader.load_all(&paths, 4).await;
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{PdfStitchError, Result};
use crate::utils::format_file_size;

/// A loaded PDF document with metadata.
#[derive(Debug)]
pub struct LoadedPdf {
    /// The PDF document.
    pub document: Document,

    /// Path to the source file.
    pub path: PathBuf,

    /// Number of pages in the document.
    pub page_count: usize,

    /// Time taken to load the document.
    pub load_time: Duration,

    /// File size in bytes.
    pub file_size: u64,
}

/// Result of a load operation (success or failure).
pub type LoadResult = Result<LoadedPdf>;

/// Statistics for a batch load operation.
#[derive(Debug, Clone, Default)]
pub struct LoadStatistics {
    /// Number of PDFs successfully loaded.
    pub success_count: usize,

    /// Number of PDFs that failed to load.
    pub failure_count: usize,

    /// Total time taken for all loads.
    pub total_time: Duration,

    /// Average time per successful load.
    pub average_time: Duration,

    /// Total size of successfully loaded files.
    pub total_size: u64,

    /// Total number of pages loaded.
    pub total_pages: usize,
}

impl LoadStatistics {
    /// Create statistics from load results.
    fn from_results(results: &[LoadResult], total_time: Duration) -> Self {
        let mut stats = Self {
            total_time,
            ..Self::default()
        };
        let mut total_load_time = Duration::ZERO;

        for result in results {
            match result {
                Ok(loaded) => {
                    stats.success_count += 1;
                    stats.total_size += loaded.file_size;
                    stats.total_pages += loaded.page_count;
                    total_load_time += loaded.load_time;
                }
                Err(_) => stats.failure_count += 1,
            }
        }

        if stats.success_count > 0 {
            stats.average_time = total_load_time / stats.success_count as u32;
        }
        stats
    }

    /// Format total size as human-readable string.
    pub fn format_total_size(&self) -> String {
        format_file_size(self.total_size)
    }
}

/// PDF reader with configurable loading behavior.
#[derive(Debug, Clone)]
pub struct PdfReader {
    /// Whether to reject documents without pages.
    verify: bool,
}

impl PdfReader {
    /// Create a new PDF reader with default settings.
    pub fn new() -> Self {
        Self { verify: true }
    }

    /// Create a reader that accepts documents without pages.
    pub fn without_verification() -> Self {
        Self { verify: false }
    }

    /// Load a single PDF document.
    ///
    /// The file is read asynchronously and parsed on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path does not exist or is not a regular file
    /// - The file is not a valid PDF
    /// - The PDF is encrypted
    /// - The PDF has no pages (unless verification is off)
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfstitch::io::reader::PdfReader;
    /// # use std::path::Path;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let reader = PdfReader::new();
    /// let loaded = reader.load(Path::new("document.pdf")).await?;
    /// println!("Loaded {} pages in {:?}", loaded.page_count, loaded.load_time);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn load(&self, path: &Path) -> Result<LoadedPdf> {
        let start = Instant::now();
        let path_buf = path.to_path_buf();

        let metadata = tokio::fs::metadata(&path_buf).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PdfStitchError::file_not_found(path_buf.clone())
            } else {
                PdfStitchError::FileNotAccessible {
                    path: path_buf.clone(),
                    source: e,
                }
            }
        })?;
        if !metadata.is_file() {
            return Err(PdfStitchError::not_a_file(path_buf));
        }

        let bytes = tokio::fs::read(&path_buf)
            .await
            .map_err(|e| PdfStitchError::FileNotAccessible {
                path: path_buf.clone(),
                source: e,
            })?;

        let reader = self.clone();
        let parse_path = path_buf.clone();
        let document = tokio::task::spawn_blocking(move || reader.parse_bytes(&parse_path, &bytes))
            .await
            .map_err(|e| PdfStitchError::other(format!("Load task failed: {e}")))??;

        let loaded = LoadedPdf {
            page_count: document.get_pages().len(),
            document,
            path: path_buf,
            load_time: start.elapsed(),
            file_size: metadata.len(),
        };

        tracing::debug!(
            path = %loaded.path.display(),
            pages = loaded.page_count,
            elapsed_ms = loaded.load_time.as_millis() as u64,
            "loaded pdf"
        );
        Ok(loaded)
    }

    /// Parse a PDF held in memory.
    ///
    /// `path` is only used in error messages.
    pub fn parse_bytes(&self, path: impl AsRef<Path>, bytes: &[u8]) -> Result<Document> {
        let path = path.as_ref().to_path_buf();

        let document = Document::load_mem(bytes).map_err(|e| {
            let message = e.to_string();
            let lower = message.to_lowercase();
            if lower.contains("crypt") || lower.contains("password") {
                PdfStitchError::encrypted_pdf(path.clone())
            } else {
                PdfStitchError::failed_to_load_pdf(path.clone(), message)
            }
        })?;

        if document.trailer.has(b"Encrypt") {
            return Err(PdfStitchError::encrypted_pdf(path));
        }

        if self.verify && document.get_pages().is_empty() {
            return Err(PdfStitchError::corrupted_pdf(path, "PDF has no pages"));
        }

        Ok(document)
    }

    /// Load multiple PDF documents one at a time, in order.
    ///
    /// Returns one result per input path.
    pub async fn load_sequential(&self, paths: &[PathBuf]) -> Vec<LoadResult> {
        let mut results = Vec::with_capacity(paths.len());

        for path in paths {
            results.push(self.load(path).await);
        }

        results
    }

    /// Load multiple PDF documents concurrently.
    ///
    /// At most `workers` loads run at once. Results come back in the same
    /// order as `paths`.
    pub async fn load_parallel(&self, paths: &[PathBuf], workers: usize) -> Vec<LoadResult> {
        use futures::stream::{self, StreamExt};

        let workers = workers.max(1);

        let tasks = paths.iter().map(|path| {
            let path = path.clone();
            let reader = self.clone();
            async move { reader.load(&path).await }
        });

        stream::iter(tasks).buffered(workers).collect::<Vec<_>>().await
    }

    /// Load all PDFs, in parallel when there are enough of them.
    ///
    /// Returns the per-file outcomes in input order together with aggregate
    /// statistics.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfstitch::io::reader::PdfReader;
    /// # use std::path::PathBuf;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let reader = PdfReader::new();
    /// let paths = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
    ///
    /// let (results, stats) = reader.load_all(&paths, 4).await;
    /// println!("Loaded {} of {} files in {:?}",
    ///          stats.success_count,
    ///          paths.len(),
    ///          stats.total_time);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn load_all(
        &self,
        paths: &[PathBuf],
        max_workers: usize,
    ) -> (Vec<LoadResult>, LoadStatistics) {
        let start = Instant::now();

        let results = if paths.len() <= 3 || max_workers <= 1 {
            self.load_sequential(paths).await
        } else {
            self.load_parallel(paths, max_workers).await
        };

        let stats = LoadStatistics::from_results(&results, start.elapsed());
        (results, stats)
    }
}

impl Default for PdfReader {
    fn default() -> Self {
        Self::new()
    }
}
