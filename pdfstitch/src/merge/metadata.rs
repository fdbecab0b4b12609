//! Document information dictionary (`/Info`) handling.
//!
//! Source documents are only read, for the title that names their outline
//! entry. The merged document gets the configured title, author, subject
//! and keywords plus creator, producer and dates.

use crate::config::Metadata;
use crate::error::{PdfStitchError, Result};
use crate::utils::text::{encode_text, object_text};
use lopdf::{Dictionary, Document, Object, StringFormat};
use std::time::{SystemTime, UNIX_EPOCH};

/// Value written to `/Creator` and `/Producer`.
const PRODUCER: &str = "pdfstitch";

/// Reads and writes document metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataManager;

impl MetadataManager {
    /// Create a new metadata manager.
    pub fn new() -> Self {
        Self
    }

    /// Title from the document's `/Info` dictionary.
    ///
    /// Blank titles count as missing.
    pub fn document_title(&self, doc: &Document) -> Option<String> {
        Self::info(doc)
            .and_then(|info| Self::string_field(doc, info, b"Title"))
            .map(|title| title.trim().to_string())
            .filter(|title| !title.is_empty())
    }

    /// Read title, author, subject and keywords.
    pub fn get_metadata(&self, doc: &Document) -> Metadata {
        let Some(info) = Self::info(doc) else {
            return Metadata::default();
        };

        Metadata::new(
            Self::string_field(doc, info, b"Title"),
            Self::string_field(doc, info, b"Author"),
            Self::string_field(doc, info, b"Subject"),
            Self::string_field(doc, info, b"Keywords"),
        )
    }

    /// Write `metadata` into the document's `/Info` dictionary.
    ///
    /// Nothing is written when `metadata` is empty. Otherwise the set fields
    /// are written along with `/Creator`, `/Producer`, `/CreationDate` and
    /// `/ModDate`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfstitch::merge::metadata::MetadataManager;
    /// # use pdfstitch::config::Metadata;
    /// # use lopdf::Document;
    /// # fn example(mut doc: Document) -> Result<(), Box<dyn std::error::Error>> {
    /// let metadata = Metadata::new(Some("Collected Papers".to_string()), None, None, None);
    /// MetadataManager::new().set_metadata(&mut doc, &metadata)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn set_metadata(&self, doc: &mut Document, metadata: &Metadata) -> Result<()> {
        if metadata.is_empty() {
            return Ok(());
        }

        let info_id = match doc.trailer.get(b"Info").and_then(|info| info.as_reference()) {
            Ok(id) => id,
            Err(_) => {
                let id = doc.add_object(Dictionary::new());
                doc.trailer.set("Info", id);
                id
            }
        };

        let info = doc
            .get_object_mut(info_id)
            .and_then(|info| info.as_dict_mut())
            .map_err(|e| PdfStitchError::MetadataFailed {
                reason: format!("Info dictionary is unusable: {e}"),
            })?;

        let fields = [
            ("Title", &metadata.title),
            ("Author", &metadata.author),
            ("Subject", &metadata.subject),
            ("Keywords", &metadata.keywords),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                info.set(key, encode_text(value));
            }
        }

        info.set("Creator", Object::string_literal(PRODUCER));
        info.set("Producer", Object::string_literal(PRODUCER));

        let date = format_pdf_date(SystemTime::now());
        info.set("CreationDate", Object::String(date.clone().into_bytes(), StringFormat::Literal));
        info.set("ModDate", Object::String(date.into_bytes(), StringFormat::Literal));

        Ok(())
    }

    fn info(doc: &Document) -> Option<&Dictionary> {
        match doc.trailer.get(b"Info").ok()? {
            Object::Reference(id) => doc.get_dictionary(*id).ok(),
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    fn string_field(doc: &Document, info: &Dictionary, key: &[u8]) -> Option<String> {
        let value = match info.get(key).ok()? {
            Object::Reference(id) => doc.get_object(*id).ok()?,
            other => other,
        };
        match value {
            Object::String(..) => object_text(value),
            _ => None,
        }
    }
}

/// Format a time as a PDF date string in UTC (`D:YYYYMMDDHHmmSSZ`).
fn format_pdf_date(time: SystemTime) -> String {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    let (year, month, day) = civil_from_days((secs / 86_400) as i64);
    let time_of_day = secs % 86_400;

    format!(
        "D:{year:04}{month:02}{day:02}{:02}{:02}{:02}Z",
        time_of_day / 3_600,
        (time_of_day % 3_600) / 60,
        time_of_day % 60
    )
}

/// Gregorian date for a count of days since 1970-01-01.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let day_of_era = z.rem_euclid(146_097);
    let year_of_era =
        (day_of_era - day_of_era / 1_460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    // months counted from March
    let mp = (5 * day_of_year + 2) / 153;
    let day = (day_of_year - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = year_of_era + era * 400 + i64::from(month <= 2);

    (year, month, day)
}
