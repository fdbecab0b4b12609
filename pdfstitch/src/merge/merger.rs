//! Core merge implementation.
//!
//! Sources are processed strictly in order. For each one the outline is
//! read and resolved against the source's own pages, shifted by the number
//! of merged pages before it, and only then are the source's pages
//! appended. The combined outline is written once at the end.

use lopdf::Document;
use serde::{Serialize, Serializer};
use std::time::{Duration, Instant};

use crate::config::{CompressionLevel, Config, Metadata, OutlineMode, SiblingLinks};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{PdfStitchError, Result};
use crate::io::{LoadedPdf, PdfReader};
use crate::merge::metadata::MetadataManager;
use crate::merge::pages::PageAppender;
use crate::outline::{
    NamedDestinationCarryOver, NamedDestinationIndex, OutlineNode, OutlineWriter, PageTable,
    annotate, count_named_destinations, count_nodes, has_outline, parse_outline,
};
use crate::utils::{display_name, format_file_size};

/// A document ready to be merged, with the name it is reported under.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Display name, usually the file name.
    pub name: String,
    /// The parsed document.
    pub document: Document,
}

impl SourceDocument {
    /// Pair a document with its display name.
    pub fn new(name: impl Into<String>, document: Document) -> Self {
        Self {
            name: name.into(),
            document,
        }
    }
}

impl From<LoadedPdf> for SourceDocument {
    fn from(loaded: LoadedPdf) -> Self {
        Self::new(display_name(&loaded.path), loaded.document)
    }
}

/// Settings that shape the merged document.
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// How source outlines are combined.
    pub outline_mode: OutlineMode,
    /// Sibling link style of the written outline.
    pub sibling_links: SiblingLinks,
    /// Carry named destinations over into the merged catalog.
    pub keep_named_destinations: bool,
    /// Output compression.
    pub compression: CompressionLevel,
    /// Metadata for the merged document.
    pub metadata: Metadata,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            outline_mode: OutlineMode::default(),
            sibling_links: SiblingLinks::default(),
            keep_named_destinations: true,
            compression: CompressionLevel::default(),
            metadata: Metadata::default(),
        }
    }
}

impl From<&Config> for MergeOptions {
    fn from(config: &Config) -> Self {
        Self {
            outline_mode: config.outline_mode,
            sibling_links: config.sibling_links,
            keep_named_destinations: config.keep_named_destinations,
            compression: config.compression,
            metadata: config.metadata.clone(),
        }
    }
}

/// Statistics about a merge operation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MergeStatistics {
    /// Number of documents merged.
    pub files_merged: usize,

    /// Total number of pages in the merged document.
    pub total_pages: usize,

    /// Outline entries written.
    pub outline_entries: usize,

    /// Outline entries left out because they had no valid page.
    pub dropped_outline_entries: usize,

    /// Named destinations written to the merged catalog.
    pub named_destinations: usize,

    /// Total size of the input files in bytes.
    pub input_size: u64,

    /// Time taken to load the inputs.
    #[serde(rename = "load_time_ms", serialize_with = "as_millis")]
    pub load_time: Duration,

    /// Time taken to build the merged document.
    #[serde(rename = "merge_time_ms", serialize_with = "as_millis")]
    pub merge_time: Duration,

    /// Whether streams were compressed.
    pub compressed: bool,
}

impl MergeStatistics {
    /// Format input size as human-readable string.
    pub fn format_input_size(&self) -> String {
        format_file_size(self.input_size)
    }
}

fn as_millis<S: Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Where one source ended up in the merged document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSummary {
    /// Display name of the source.
    pub name: String,
    /// Zero-based merged page index of the source's first page.
    pub start_page: usize,
    /// Pages contributed.
    pub page_count: usize,
    /// Whether the source has an `/Outlines` entry.
    pub has_outline: bool,
    /// Outline entries read from the source.
    pub outline_entries: usize,
    /// Named destinations the source defines.
    pub named_destinations: usize,
}

/// What a merge would do, computed without building the output.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MergePlan {
    /// One entry per source, in merge order.
    pub sources: Vec<SourceSummary>,
    /// Pages the merged document would have.
    pub total_pages: usize,
}

/// Result of a merge operation.
#[derive(Debug)]
pub struct MergeOutput {
    /// The merged PDF document.
    pub document: Document,

    /// Statistics about the merge.
    pub statistics: MergeStatistics,

    /// Per-source placement, in merge order.
    pub sources: Vec<SourceSummary>,

    /// Everything reported while merging.
    pub diagnostics: Vec<Diagnostic>,
}

/// Running state of one merge call.
#[derive(Debug, Default)]
pub struct MergeState {
    /// Top-level outline entries gathered so far.
    pub combined_outline: Vec<OutlineNode>,
    /// Merged pages preceding the next source.
    pub page_offset: usize,
}

/// PDF merger that combines documents and their outlines.
#[derive(Debug, Clone, Default)]
pub struct Merger {
    /// Reader for loading PDFs.
    reader: PdfReader,

    /// Metadata manager for document properties.
    metadata_manager: MetadataManager,
}

impl Merger {
    /// Create a new merger with default settings.
    pub fn new() -> Self {
        Self {
            reader: PdfReader::new(),
            metadata_manager: MetadataManager::new(),
        }
    }

    /// Create a merger that loads through `reader`.
    pub fn with_reader(reader: PdfReader) -> Self {
        Self {
            reader,
            ..Self::new()
        }
    }

    /// Load every input named by `config` and merge them.
    ///
    /// # Errors
    ///
    /// Returns an error if any input fails to load or the merged document
    /// cannot be assembled. Outline problems are reported as diagnostics
    /// in the returned [`MergeOutput`] instead.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfstitch::merge::Merger;
    /// # use pdfstitch::config::Config;
    /// # async fn example(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    /// let output = Merger::new().merge(&config).await?;
    /// println!(
    ///     "Merged {} files into {} pages with {} outline entries",
    ///     output.statistics.files_merged,
    ///     output.statistics.total_pages,
    ///     output.statistics.outline_entries,
    /// );
    /// # Ok(())
    /// # }
    /// ```
    pub async fn merge(&self, config: &Config) -> Result<MergeOutput> {
        self.merge_with_diagnostics(config, Diagnostics::new()).await
    }

    /// Like [`merge`](Self::merge), reporting into a caller-supplied
    /// collector.
    pub async fn merge_with_diagnostics(
        &self,
        config: &Config,
        diagnostics: Diagnostics,
    ) -> Result<MergeOutput> {
        let load_start = Instant::now();
        let loaded = self.load(config).await?;
        let load_time = load_start.elapsed();

        let input_size = loaded.iter().map(|pdf| pdf.file_size).sum();
        let sources = loaded.into_iter().map(SourceDocument::from).collect();

        let mut output = self.merge_documents(sources, &MergeOptions::from(config), diagnostics)?;
        output.statistics.load_time = load_time;
        output.statistics.input_size = input_size;

        Ok(output)
    }

    /// Merge documents that are already in memory.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStitchError::NoFilesToMerge`] for an empty `sources`,
    /// or an error if a source's page tree or the merged catalog cannot be
    /// used.
    pub fn merge_documents(
        &self,
        sources: Vec<SourceDocument>,
        options: &MergeOptions,
        mut diagnostics: Diagnostics,
    ) -> Result<MergeOutput> {
        if sources.is_empty() {
            return Err(PdfStitchError::NoFilesToMerge);
        }

        let merge_start = Instant::now();
        let files_merged = sources.len();

        let mut appender = PageAppender::new();
        let mut carry_over = NamedDestinationCarryOver::new();
        let mut state = MergeState::default();
        let mut summaries = Vec::with_capacity(files_merged);

        for source in sources {
            diagnostics.set_source(Some(source.name.clone()));
            let summary = self.merge_source(
                source,
                options,
                &mut state,
                &mut appender,
                &mut carry_over,
                &mut diagnostics,
            )?;
            tracing::debug!(
                source = %summary.name,
                start_page = summary.start_page,
                pages = summary.page_count,
                "merged source"
            );
            summaries.push(summary);
        }
        diagnostics.set_source(None);

        let mut document = appender.finish();

        let outline = if state.combined_outline.is_empty() {
            Default::default()
        } else {
            OutlineWriter::new(options.sibling_links).write(
                &mut document,
                &state.combined_outline,
                &mut diagnostics,
            )?
        };

        let named_destinations = if options.keep_named_destinations {
            carry_over.write(&mut document)?
        } else {
            0
        };

        self.metadata_manager
            .set_metadata(&mut document, &options.metadata)?;

        finalize(&mut document, options.compression);

        let statistics = MergeStatistics {
            files_merged,
            total_pages: state.page_offset,
            outline_entries: outline.written,
            dropped_outline_entries: outline.dropped,
            named_destinations,
            compressed: options.compression != CompressionLevel::None,
            merge_time: merge_start.elapsed(),
            ..MergeStatistics::default()
        };

        tracing::info!(
            files = statistics.files_merged,
            pages = statistics.total_pages,
            outline_entries = statistics.outline_entries,
            warnings = diagnostics.warning_count(),
            "merge complete"
        );

        Ok(MergeOutput {
            document,
            statistics,
            sources: summaries,
            diagnostics: diagnostics.into_entries(),
        })
    }

    /// Load the inputs named by `config` and describe how they would be
    /// merged.
    pub async fn plan(&self, config: &Config) -> Result<MergePlan> {
        let sources: Vec<SourceDocument> = self
            .load(config)
            .await?
            .into_iter()
            .map(SourceDocument::from)
            .collect();
        Ok(self.plan_documents(&sources))
    }

    /// Describe how `sources` would be merged.
    pub fn plan_documents(&self, sources: &[SourceDocument]) -> MergePlan {
        let mut plan = MergePlan::default();
        // plans are quiet; the real merge reports
        let mut diagnostics = Diagnostics::new();

        for source in sources {
            let document = &source.document;
            let pages = PageTable::from_document(document);
            let named = NamedDestinationIndex::build(document, &pages, &mut diagnostics);
            let outline_entries = count_nodes(&parse_outline(document, &mut diagnostics));

            plan.sources.push(SourceSummary {
                name: source.name.clone(),
                start_page: plan.total_pages,
                page_count: pages.len(),
                has_outline: has_outline(document),
                outline_entries,
                named_destinations: named.len(),
            });
            plan.total_pages += pages.len();
        }

        plan
    }

    async fn load(&self, config: &Config) -> Result<Vec<LoadedPdf>> {
        let (results, stats) = self
            .reader
            .load_all(config.inputs(), config.effective_jobs())
            .await;

        tracing::debug!(
            loaded = stats.success_count,
            failed = stats.failure_count,
            pages = stats.total_pages,
            "loaded inputs"
        );

        let loaded = results.into_iter().collect::<Result<Vec<_>>>()?;
        if loaded.is_empty() {
            return Err(PdfStitchError::NoFilesToMerge);
        }
        Ok(loaded)
    }

    fn merge_source(
        &self,
        source: SourceDocument,
        options: &MergeOptions,
        state: &mut MergeState,
        appender: &mut PageAppender,
        carry_over: &mut NamedDestinationCarryOver,
        diagnostics: &mut Diagnostics,
    ) -> Result<SourceSummary> {
        let SourceDocument { name, mut document } = source;
        let start_page = state.page_offset;
        let pages = PageTable::from_document(&document);

        let mut summary = SourceSummary {
            name,
            start_page,
            page_count: pages.len(),
            has_outline: has_outline(&document),
            outline_entries: 0,
            named_destinations: count_named_destinations(&document),
        };

        let title = || {
            self.metadata_manager
                .document_title(&document)
                .unwrap_or_else(|| summary.name.clone())
        };

        match options.outline_mode {
            OutlineMode::None => {}
            // an empty source still gets its entry; one past the last page is
            // dropped by the writer
            OutlineMode::OneEntryPerFile => {
                state
                    .combined_outline
                    .push(OutlineNode::with_page(title(), start_page));
            }
            OutlineMode::RetainEntries | OutlineMode::RetainAsOneEntry => {
                let index = NamedDestinationIndex::build(&document, &pages, diagnostics);
                let tree = parse_outline(&document, diagnostics);
                let outline_entries = count_nodes(&tree);
                let tree = annotate(tree, start_page, &pages, &index, diagnostics);

                if options.outline_mode == OutlineMode::RetainEntries {
                    state.combined_outline.extend(tree);
                } else {
                    state
                        .combined_outline
                        .push(OutlineNode::with_page(title(), start_page).children(tree));
                }

                summary.outline_entries = outline_entries;
            }
        }

        appender.renumber(&mut document);
        if options.keep_named_destinations {
            carry_over.absorb(&document, diagnostics);
        }

        let appended = appender.append(document)?;
        state.page_offset += appended;

        Ok(summary)
    }
}

/// Compress, prune and renumber the finished document.
fn finalize(document: &mut Document, compression: CompressionLevel) {
    match compression {
        CompressionLevel::None => {}
        CompressionLevel::Standard => document.compress(),
        CompressionLevel::Maximum => {
            document.compress();
            document.delete_zero_length_streams();
        }
    }

    // source catalogs, outlines and name trees are no longer referenced
    document.prune_objects();
    document.renumber_objects();
}
