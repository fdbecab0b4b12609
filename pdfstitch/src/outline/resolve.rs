//! Destination resolution.
//!
//! Maps an outline entry's raw destination to a zero-based page of the
//! document the entry came from. Failures are never errors: they yield
//! `None` and a diagnostic, and the entry is dropped later at write time.

use lopdf::{Dictionary, Object};

use super::names::NamedDestinationIndex;
use super::{OutlineNode, PageTable, RawDestination};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::utils::text::object_text;

/// Resolve the page an outline entry points at.
///
/// An entry that already carries a page is returned unchanged, so resolving
/// twice gives the same answer.
pub fn resolve_page(
    node: &OutlineNode,
    pages: &PageTable,
    index: &NamedDestinationIndex,
    diagnostics: &mut Diagnostics,
) -> Option<usize> {
    if node.page.is_some() {
        return node.page;
    }
    resolve_destination(&node.destination, pages, index, diagnostics)
}

/// Resolve a raw destination against its own document.
pub fn resolve_destination(
    destination: &RawDestination,
    pages: &PageTable,
    index: &NamedDestinationIndex,
    diagnostics: &mut Diagnostics,
) -> Option<usize> {
    match destination {
        RawDestination::Explicit(array) => resolve_explicit(array, pages, diagnostics),
        RawDestination::Named(name) => resolve_named(name, index, diagnostics),
        RawDestination::Action(action) => resolve_action(action, pages, index, diagnostics),
        RawDestination::None => None,
    }
}

fn resolve_explicit(
    array: &[Object],
    pages: &PageTable,
    diagnostics: &mut Diagnostics,
) -> Option<usize> {
    let page = match array.first() {
        Some(Object::Reference(id)) => pages.index_of(*id),
        _ => None,
    };

    if page.is_none() {
        diagnostics.warn(
            DiagnosticKind::UnresolvedExplicitDestination,
            "explicit destination does not point at a page of this document",
        );
    }
    page
}

fn resolve_named(
    name: &str,
    index: &NamedDestinationIndex,
    diagnostics: &mut Diagnostics,
) -> Option<usize> {
    let Some(destination) = index.lookup(name) else {
        diagnostics.warn(
            DiagnosticKind::UnknownNamedDestination {
                name: name.to_string(),
            },
            format!("named destination '{name}' is not defined"),
        );
        return None;
    };

    if destination.page.is_none() {
        diagnostics.warn(
            DiagnosticKind::UnresolvedExplicitDestination,
            format!("named destination '{name}' does not point at a page of this document"),
        );
    }
    destination.page
}

fn resolve_action(
    action: &Dictionary,
    pages: &PageTable,
    index: &NamedDestinationIndex,
    diagnostics: &mut Diagnostics,
) -> Option<usize> {
    let kind = action.get(b"S").ok().and_then(object_text);
    if kind.as_deref() != Some("GoTo") {
        let action = kind.unwrap_or_else(|| "unknown".to_string());
        diagnostics.warn(
            DiagnosticKind::UnsupportedAction {
                action: action.clone(),
            },
            format!("outline action '{action}' is not supported"),
        );
        return None;
    }

    match action.get(b"D") {
        Ok(Object::Array(array)) => resolve_explicit(array, pages, diagnostics),
        Ok(target) => match object_text(target) {
            Some(name) => resolve_named(&name, index, diagnostics),
            None => {
                diagnostics.warn(
                    DiagnosticKind::MissingDestination,
                    "GoTo action has an unusable /D entry",
                );
                None
            }
        },
        Err(_) => {
            diagnostics.warn(
                DiagnosticKind::MissingDestination,
                "GoTo action has no /D entry",
            );
            None
        }
    }
}
