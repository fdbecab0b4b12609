#![no_main]

use libfuzzer_sys::fuzz_target;
use lopdf::Document;
use pdfstitch::diagnostics::Diagnostics;
use pdfstitch::outline::{NamedDestinationIndex, PageTable, annotate, parse_outline};

fuzz_target!(|data: &[u8]| {
    let Ok(doc) = Document::load_mem(data) else {
        return;
    };

    let mut diagnostics = Diagnostics::new();
    let pages = PageTable::from_document(&doc);
    let index = NamedDestinationIndex::build(&doc, &pages, &mut diagnostics);
    let tree = annotate(parse_outline(&doc, &mut diagnostics), 0, &pages, &index, &mut diagnostics);

    // every resolved entry must land on a page of the document
    fn check(nodes: &[pdfstitch::outline::OutlineNode], page_count: usize) {
        for node in nodes {
            if let Some(page) = node.page {
                assert!(page < page_count);
            }
            check(&node.children, page_count);
        }
    }
    check(&tree, pages.len());
});
