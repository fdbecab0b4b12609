//! CLI argument parsing for pdfstitch.
//!
//! This module defines the command-line interface structure using `clap`
//! and turns parsed arguments into a validated [`Config`].
//!
//! # Examples
//!
//! ```no_run
//! use pdfstitch_cli::cli::Cli;
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! println!("Merging {} files", cli.inputs.len());
//! ```

use clap::Parser;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use pdfstitch::config::{
    CompressionLevel, Config, Metadata, OutlineMode, OverwriteMode, SiblingLinks,
};
use pdfstitch::error::{PdfStitchError, Result};
use pdfstitch::utils::collect_paths_for_patterns;

/// Merge PDF files and carry their outlines into the merged document.
///
/// Inputs are concatenated in the order given. Their bookmarks are resolved
/// against the merged page sequence and written as a new outline; named
/// destinations are carried over so internal links keep working.
#[derive(Parser, Debug)]
#[command(name = "pdfstitch")]
#[command(version)]
#[command(about = "Merge PDF files and carry their outlines across", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Input PDF files to merge (in order)
    ///
    /// Glob patterns are expanded; matches of one pattern are sorted.
    ///
    /// Examples:
    ///   pdfstitch intro.pdf chapter*.pdf -o book.pdf
    #[arg(value_name = "FILE")]
    pub inputs: Vec<PathBuf>,

    /// Output PDF file path
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// How source outlines appear in the merged document
    ///
    /// - none: no outline
    /// - one-entry-per-file: one entry per input, source outlines ignored
    /// - retain-entries: source entries side by side at the top level
    /// - retain-as-one-entry: one entry per input, its outline nested below
    #[arg(short = 'm', long = "outline", value_name = "MODE")]
    #[arg(default_value = "retain-as-one-entry", value_parser = OutlineMode::VARIANTS)]
    pub outline_mode: String,

    /// Sibling links written between outline entries
    ///
    /// - compat: /Next on each entry, /Prev on the last one only
    /// - full: /Next and /Prev wherever a neighbour exists
    #[arg(long, value_name = "LINKS", default_value = "compat")]
    #[arg(value_parser = ["compat", "full"])]
    pub outline_links: String,

    /// Do not carry named destinations into the merged document
    #[arg(long)]
    pub no_named_dests: bool,

    /// Dry run - load the inputs and print the merge plan only
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Verbose output - show every diagnostic and detailed statistics
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Force overwrite of existing output file without confirmation
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite existing output file
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Compression level for output PDF
    #[arg(short, long, value_name = "LEVEL", default_value = "standard")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,

    /// Set title metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Set author metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub author: Option<String>,

    /// Set subject metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub subject: Option<String>,

    /// Set keywords metadata for output PDF (comma-separated)
    #[arg(long, value_name = "TEXT")]
    pub keywords: Option<String>,

    /// Read additional inputs from a file (one path per line)
    ///
    /// Lines starting with '#' are comments. Use '-' to read from stdin.
    /// Listed files are merged after the ones given as arguments.
    #[arg(long, value_name = "FILE")]
    pub input_list: Option<PathBuf>,

    /// Number of PDFs loaded concurrently (default: CPU cores)
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Write a JSON report with statistics and diagnostics
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

impl Cli {
    /// Convert CLI arguments into a validated Config.
    ///
    /// Inputs are taken verbatim; use [`get_all_inputs`](Self::get_all_inputs)
    /// for glob expansion and input lists.
    ///
    /// # Errors
    ///
    /// Returns an error if an option value is invalid or the resulting
    /// configuration fails validation.
    pub fn to_config(&self) -> Result<Config> {
        let outline_mode = OutlineMode::from_str(&self.outline_mode)?;
        let sibling_links = SiblingLinks::from_str(&self.outline_links)?;
        let compression = CompressionLevel::from_str(&self.compression)?;

        let overwrite_mode = if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        let metadata = Metadata::new(
            self.title.clone(),
            self.author.clone(),
            self.subject.clone(),
            self.keywords.clone(),
        );

        let config = Config {
            inputs: self.inputs.clone(),
            output: self.output.clone(),
            dry_run: self.dry_run,
            verbose: self.verbose,
            overwrite_mode,
            quiet: self.quiet,
            outline_mode,
            sibling_links,
            keep_named_destinations: !self.no_named_dests,
            compression,
            metadata,
            jobs: self.jobs,
            report: self.report.clone(),
        };

        config.validate().map_err(|e| {
            PdfStitchError::invalid_config(format!("Configuration validation failed: {e}"))
        })?;

        Ok(config)
    }

    /// Validate CLI arguments before processing.
    ///
    /// # Errors
    ///
    /// Returns an error if there is nothing to merge or an option value is
    /// out of range.
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() && self.input_list.is_none() {
            return Err(PdfStitchError::invalid_config("No input files specified"));
        }

        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            return Err(PdfStitchError::invalid_config(
                "Number of jobs must be at least 1",
            ));
        }

        OutlineMode::from_str(&self.outline_mode)?;
        SiblingLinks::from_str(&self.outline_links)?;
        CompressionLevel::from_str(&self.compression)?;

        Ok(())
    }

    /// Get all input paths: expanded arguments, then the input list.
    ///
    /// # Errors
    ///
    /// Returns an error if a glob pattern is invalid, the input list cannot
    /// be read, or no inputs remain.
    pub async fn get_all_inputs(&self) -> Result<Vec<PathBuf>> {
        let patterns = self
            .inputs
            .iter()
            .map(|path| path.to_string_lossy().into_owned());
        let mut all_inputs = collect_paths_for_patterns(patterns)?;

        if let Some(ref input_list_path) = self.input_list {
            all_inputs.extend(read_input_list(input_list_path).await?);
        }

        if all_inputs.is_empty() {
            return Err(PdfStitchError::NoFilesToMerge);
        }

        Ok(all_inputs)
    }
}

/// Read input paths from a file, or stdin for `-`.
async fn read_input_list(path: &Path) -> Result<Vec<PathBuf>> {
    use tokio::io::AsyncReadExt;

    let read_error = |e| PdfStitchError::FailedToReadInputList {
        path: path.to_path_buf(),
        source: e,
    };

    let contents = if path.as_os_str() == "-" {
        let mut buffer = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buffer)
            .await
            .map_err(read_error)?;
        buffer
    } else {
        tokio::fs::read_to_string(path).await.map_err(read_error)?
    };

    parse_input_list(path, &contents)
}

/// Parse the contents of an input list.
fn parse_input_list(path: &Path, contents: &str) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.contains('\0') {
            return Err(PdfStitchError::InvalidInputList {
                path: path.to_path_buf(),
                line_number: index + 1,
                details: "Path contains a NUL byte".to_string(),
            });
        }

        paths.push(PathBuf::from(line));
    }

    Ok(paths)
}
