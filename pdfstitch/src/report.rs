//! JSON report describing a finished merge.
//!
//! Written by `pdfstitch --report <FILE>`. The report carries the merge
//! statistics, where each source landed and every diagnostic raised.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::diagnostics::{Diagnostic, Severity};
use crate::error::{PdfStitchError, Result};
use crate::merge::{MergeOutput, MergeStatistics, SourceSummary};

/// Machine-readable summary of a merge.
#[derive(Debug, Clone, Serialize)]
pub struct MergeReport {
    /// Name of the tool that produced the report.
    pub tool: &'static str,
    /// Version of the tool.
    pub version: &'static str,
    /// Path of the merged document.
    pub output: PathBuf,
    /// Merge statistics.
    pub statistics: MergeStatistics,
    /// Placement of each source document.
    pub sources: Vec<SourceSummary>,
    /// Number of warnings among `diagnostics`.
    pub warnings: usize,
    /// Every diagnostic raised, in order.
    pub diagnostics: Vec<Diagnostic>,
}

impl MergeReport {
    /// Build a report for `output`, written to `path`.
    pub fn new(output_path: impl Into<PathBuf>, output: &MergeOutput) -> Self {
        Self::from_parts(
            output_path,
            output.statistics.clone(),
            output.sources.clone(),
            output.diagnostics.clone(),
        )
    }

    /// Build a report from its parts.
    pub fn from_parts(
        output_path: impl Into<PathBuf>,
        statistics: MergeStatistics,
        sources: Vec<SourceSummary>,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        Self {
            tool: crate::NAME,
            version: crate::VERSION,
            output: output_path.into(),
            statistics,
            sources,
            warnings: diagnostics
                .iter()
                .filter(|d| d.severity == Severity::Warning)
                .count(),
            diagnostics,
        }
    }

    /// Render the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the report cannot be serialized or written.
    pub async fn write_to(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| PdfStitchError::FailedToWrite {
                path: path.to_path_buf(),
                source: e,
            })?;

        tracing::debug!(path = %path.display(), "wrote merge report");
        Ok(())
    }
}
