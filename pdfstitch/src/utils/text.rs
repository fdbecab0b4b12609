//! PDF text string conversion.
//!
//! Text strings in titles, `/Info` entries and name-tree keys are either
//! UTF-16BE with a byte order mark or a single-byte encoding. Files in the
//! wild also carry raw UTF-8, which is accepted when it is valid.

use lopdf::{Object, StringFormat};

const UTF16_BE_BOM: [u8; 2] = [0xFE, 0xFF];

/// Decode the bytes of a PDF text string.
pub fn decode_text(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&UTF16_BE_BOM) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        // Latin-1 is close enough to PDFDocEncoding for display purposes
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Decode a string or name object, returning `None` for anything else.
pub fn object_text(object: &Object) -> Option<String> {
    match object {
        Object::String(bytes, _) => Some(decode_text(bytes)),
        Object::Name(name) => Some(decode_text(name)),
        _ => None,
    }
}

/// Encode text as a PDF string object.
///
/// ASCII text is written as a literal string. Anything else is written as
/// UTF-16BE with a byte order mark in hexadecimal form.
pub fn encode_text(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }

    let mut bytes = UTF16_BE_BOM.to_vec();
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf16_with_bom() {
        let bytes = [0xFE, 0xFF, 0x00, 0x48, 0x00, 0xE9];
        assert_eq!(decode_text(&bytes), "Hé");
    }

    #[test]
    fn test_decode_utf8_and_latin1() {
        assert_eq!(decode_text(b"Intro"), "Intro");
        assert_eq!(decode_text("Café".as_bytes()), "Café");
        assert_eq!(decode_text(&[0x43, 0x61, 0x66, 0xE9]), "Café");
    }

    #[test]
    fn test_encode_ascii_is_literal() {
        assert!(matches!(
            encode_text("Chapter 1"),
            Object::String(ref bytes, StringFormat::Literal) if bytes.as_slice() == b"Chapter 1"
        ));
    }

    #[test]
    fn test_encode_non_ascii_round_trips() {
        let encoded = encode_text("Über Größe");
        match &encoded {
            Object::String(bytes, StringFormat::Hexadecimal) => {
                assert_eq!(&bytes[..2], &UTF16_BE_BOM);
                assert_eq!(decode_text(bytes), "Über Größe");
            }
            other => panic!("unexpected encoding: {other:?}"),
        }
    }

    #[test]
    fn test_object_text() {
        assert_eq!(
            object_text(&Object::Name(b"Foo".to_vec())),
            Some("Foo".to_string())
        );
        assert_eq!(object_text(&Object::Integer(3)), None);
    }
}
