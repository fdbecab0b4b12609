//! Configuration module for pdfstitch.
//!
//! This module holds the validated, normalized settings that drive a merge.
//! The CLI builds a [`Config`]; library users can build one directly or use
//! [`MergeOptions`](crate::merge::MergeOptions) when documents are already in
//! memory.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf, str::FromStr};

use crate::PdfStitchError;

/// Compression level for the output PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// No compression - preserves exact quality and structure.
    None,
    /// Compress content streams.
    #[default]
    Standard,
    /// Compress streams and drop empty ones.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = PdfStitchError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(PdfStitchError::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// How source outlines end up in the merged document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutlineMode {
    /// No outline at all.
    None,
    /// One top-level entry per source file, pointing at its first page.
    /// Source outlines are ignored.
    OneEntryPerFile,
    /// Source outline entries placed directly at the top level.
    RetainEntries,
    /// One top-level entry per source file with its outline nested below.
    #[default]
    RetainAsOneEntry,
}

impl OutlineMode {
    /// Accepted spellings, in the order shown in help output.
    pub const VARIANTS: [&'static str; 4] = [
        "none",
        "one-entry-per-file",
        "retain-entries",
        "retain-as-one-entry",
    ];

    /// Whether source outlines need to be read in this mode.
    pub fn reads_source_outlines(self) -> bool {
        matches!(self, Self::RetainEntries | Self::RetainAsOneEntry)
    }
}

impl FromStr for OutlineMode {
    type Err = PdfStitchError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "none" => Ok(Self::None),
            "one-entry-per-file" => Ok(Self::OneEntryPerFile),
            "retain-entries" => Ok(Self::RetainEntries),
            "retain-as-one-entry" => Ok(Self::RetainAsOneEntry),
            _ => Err(PdfStitchError::invalid_config(format!(
                "Invalid outline mode: {s}. Must be one of: {}",
                Self::VARIANTS.join(", ")
            ))),
        }
    }
}

impl fmt::Display for OutlineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::OneEntryPerFile => "one-entry-per-file",
            Self::RetainEntries => "retain-entries",
            Self::RetainAsOneEntry => "retain-as-one-entry",
        };
        f.write_str(name)
    }
}

/// Which sibling links the outline writer emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiblingLinks {
    /// One key per item: `/Next` on every item but the last, `/Prev` on the
    /// last one only (a lone item points at itself).
    #[default]
    Compat,
    /// `/Next` and `/Prev` wherever a neighbour exists.
    Full,
}

impl FromStr for SiblingLinks {
    type Err = PdfStitchError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "compat" => Ok(Self::Compat),
            "full" => Ok(Self::Full),
            _ => Err(PdfStitchError::invalid_config(format!(
                "Invalid outline link style: {s}. Must be one of: compat, full"
            ))),
        }
    }
}

/// PDF metadata to set on the output document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title.
    pub title: Option<String>,
    /// Document author.
    pub author: Option<String>,
    /// Document subject.
    pub subject: Option<String>,
    /// Document keywords (comma-separated).
    pub keywords: Option<String>,
}

impl Metadata {
    /// Check if any metadata fields are set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.subject.is_none()
            && self.keywords.is_none()
    }

    /// Create metadata from optional strings, trimming whitespace.
    pub fn new(
        title: Option<String>,
        author: Option<String>,
        subject: Option<String>,
        keywords: Option<String>,
    ) -> Self {
        let to_string_opt = |opt: Option<String>| {
            opt.filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string())
        };

        Self {
            title: to_string_opt(title),
            author: to_string_opt(author),
            subject: to_string_opt(subject),
            keywords: to_string_opt(keywords),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// Complete configuration for a merge operation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Input PDF file paths (in merge order).
    pub inputs: Vec<PathBuf>,

    /// Output PDF file path.
    pub output: PathBuf,

    /// Dry run mode - print the merge plan without creating output.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// How source outlines are carried over.
    pub outline_mode: OutlineMode,

    /// Sibling link style of the written outline.
    pub sibling_links: SiblingLinks,

    /// Re-publish the sources' named destinations in the merged document.
    pub keep_named_destinations: bool,

    /// Compression level for output.
    pub compression: CompressionLevel,

    /// Metadata to set on output document.
    pub metadata: Metadata,

    /// Number of parallel loads (None = auto-detect).
    pub jobs: Option<usize>,

    /// Where to write a JSON merge report, if anywhere.
    pub report: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            output: PathBuf::new(),
            dry_run: false,
            verbose: false,
            overwrite_mode: OverwriteMode::default(),
            quiet: false,
            outline_mode: OutlineMode::default(),
            sibling_links: SiblingLinks::default(),
            keep_named_destinations: true,
            compression: CompressionLevel::default(),
            metadata: Metadata::default(),
            jobs: None,
            report: None,
        }
    }
}

impl Config {
    /// Returns a reference to inputs.
    pub fn inputs(&self) -> &[PathBuf] {
        self.inputs.as_ref()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No input files are specified
    /// - Verbose and quiet modes are both enabled
    /// - Jobs count is zero
    /// - The output or report path is also an input
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            bail!("No input files specified");
        }

        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            bail!("Number of jobs must be at least 1");
        }

        for input in &self.inputs {
            if input == &self.output {
                bail!(
                    "Output file cannot be the same as an input file: {}",
                    self.output.display()
                );
            }
            if self.report.as_ref() == Some(input) {
                bail!(
                    "Report file cannot be the same as an input file: {}",
                    input.display()
                );
            }
        }

        if self.report.as_ref() == Some(&self.output) {
            bail!("Report file cannot be the same as the output file");
        }

        Ok(())
    }

    /// Get the effective number of parallel loads.
    ///
    /// Returns the configured job count, or the number of CPU cores if auto-detect.
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Check if output should be displayed.
    ///
    /// Returns false if in quiet mode and not doing a dry run.
    pub fn should_print(&self) -> bool {
        !self.quiet || self.dry_run
    }
}
