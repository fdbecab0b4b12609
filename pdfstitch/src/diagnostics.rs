//! Structured, non-fatal reports produced while merging.
//!
//! Outline and name-tree problems never abort a merge. Each one becomes a
//! [`Diagnostic`] that is stored in a [`Diagnostics`] collector, forwarded to
//! an optional callback, and emitted as a `tracing` event.

use serde::Serialize;
use std::fmt;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Expected condition worth knowing about (e.g. a document without bookmarks).
    Info,
    /// Something in a source document was skipped or could not be resolved.
    Warning,
}

/// What a diagnostic is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The document has no `/Names/Dests` tree.
    MissingNamedDestinations,
    /// The document has no `/Outlines` entry.
    MissingOutline,
    /// An explicit destination does not point at a page of its document.
    UnresolvedExplicitDestination,
    /// A `GoTo` action names a destination the document does not define.
    UnknownNamedDestination {
        /// The name as it appeared in the action.
        name: String,
    },
    /// An outline action other than `GoTo`.
    UnsupportedAction {
        /// Value of the action's `/S` entry.
        action: String,
    },
    /// A `GoTo` action without a `/D` entry.
    MissingDestination,
    /// An outline chain loops back onto itself.
    OutlineCycle,
    /// Outline nesting exceeds the supported depth.
    OutlineTooDeep,
    /// An outline link does not lead to a dictionary.
    MalformedOutline,
    /// An entry was left out of the merged outline.
    DroppedOutlineEntry {
        /// Number of descendants dropped along with the entry.
        descendants: usize,
    },
    /// A named destination was already defined by an earlier document.
    DuplicateNamedDestination {
        /// The duplicated name.
        name: String,
    },
}

/// A single report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity of the report.
    pub severity: Severity,
    /// Category and category-specific data.
    #[serde(flatten)]
    pub kind: DiagnosticKind,
    /// Source document being processed, if any.
    pub source: Option<String>,
    /// Human readable description.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{source}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

type Callback = Box<dyn FnMut(&Diagnostic) + Send>;

/// Collector for diagnostics raised during a merge.
#[derive(Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    source: Option<String>,
    callback: Option<Callback>,
}

impl Diagnostics {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collector that also hands every report to `callback`.
    pub fn with_callback<F>(callback: F) -> Self
    where
        F: FnMut(&Diagnostic) + Send + 'static,
    {
        Self {
            callback: Some(Box::new(callback)),
            ..Self::default()
        }
    }

    /// Attribute subsequent reports to the named source document.
    pub fn set_source(&mut self, source: Option<String>) {
        self.source = source;
    }

    /// Name of the document reports are currently attributed to.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Record an informational report.
    pub fn info(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.report(Severity::Info, kind, message);
    }

    /// Record a warning.
    pub fn warn(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.report(Severity::Warning, kind, message);
    }

    /// Record a report with an explicit severity.
    pub fn report(&mut self, severity: Severity, kind: DiagnosticKind, message: impl Into<String>) {
        let diagnostic = Diagnostic {
            severity,
            kind,
            source: self.source.clone(),
            message: message.into(),
        };

        let source = diagnostic.source.as_deref().unwrap_or("-");
        match severity {
            Severity::Info => tracing::info!(source, "{}", diagnostic.message),
            Severity::Warning => tracing::warn!(source, "{}", diagnostic.message),
        }

        if let Some(callback) = self.callback.as_mut() {
            callback(&diagnostic);
        }
        self.entries.push(diagnostic);
    }

    /// All reports in the order they were raised.
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Consume the collector, returning its reports.
    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }

    /// Number of reports collected.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no report has been collected.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of warnings collected.
    pub fn warning_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// Iterate over reports matching `predicate`.
    pub fn matching<'a, P>(&'a self, predicate: P) -> impl Iterator<Item = &'a Diagnostic> + 'a
    where
        P: Fn(&DiagnosticKind) -> bool + 'a,
    {
        self.entries.iter().filter(move |d| predicate(&d.kind))
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("entries", &self.entries)
            .field("source", &self.source)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}
