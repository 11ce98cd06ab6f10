//! Text encodings and byte-order-mark detection
//!
//! Buffers are canonical UTF-8 internally. Files carrying a BOM for
//! UTF-16/32 are transcoded on load and converted back on save; the
//! buffer remembers the encoding and whether to re-emit the BOM.

use crate::unicode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingKind {
    Utf8,
    Utf16Be,
    Utf16Le,
    Utf32Be,
    Utf32Le,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoding {
    pub kind: EncodingKind,
    /// Emit a byte-order mark when saving.
    pub bom: bool,
}

impl Encoding {
    pub fn utf8() -> Self {
        Encoding {
            kind: EncodingKind::Utf8,
            bom: false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self.kind {
            EncodingKind::Utf8 => "UTF-8",
            EncodingKind::Utf16Be => "UTF-16BE",
            EncodingKind::Utf16Le => "UTF-16LE",
            EncodingKind::Utf32Be => "UTF-32BE",
            EncodingKind::Utf32Le => "UTF-32LE",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name.to_ascii_uppercase().as_str() {
            "UTF-8" | "UTF8" => EncodingKind::Utf8,
            "UTF-16BE" => EncodingKind::Utf16Be,
            "UTF-16LE" => EncodingKind::Utf16Le,
            "UTF-32BE" => EncodingKind::Utf32Be,
            "UTF-32LE" => EncodingKind::Utf32Le,
            _ => return None,
        };
        Some(Encoding { kind, bom: kind != EncodingKind::Utf8 })
    }

    pub fn bom_bytes(&self) -> &'static [u8] {
        match self.kind {
            EncodingKind::Utf8 => &[0xef, 0xbb, 0xbf],
            EncodingKind::Utf16Be => &[0xfe, 0xff],
            EncodingKind::Utf16Le => &[0xff, 0xfe],
            EncodingKind::Utf32Be => &[0x00, 0x00, 0xfe, 0xff],
            EncodingKind::Utf32Le => &[0xff, 0xfe, 0x00, 0x00],
        }
    }
}

/// Detect a BOM at the head of `data`. Returns the encoding and the
/// BOM length to skip.
pub fn detect_bom(data: &[u8]) -> Option<(Encoding, usize)> {
    // UTF-32LE must be checked before UTF-16LE: its BOM starts with
    // the same two bytes
    const TABLE: [(EncodingKind, &[u8]); 5] = [
        (EncodingKind::Utf8, &[0xef, 0xbb, 0xbf]),
        (EncodingKind::Utf32Le, &[0xff, 0xfe, 0x00, 0x00]),
        (EncodingKind::Utf32Be, &[0x00, 0x00, 0xfe, 0xff]),
        (EncodingKind::Utf16Be, &[0xfe, 0xff]),
        (EncodingKind::Utf16Le, &[0xff, 0xfe]),
    ];
    for (kind, bom) in TABLE {
        if data.starts_with(bom) {
            return Some((Encoding { kind, bom: true }, bom.len()));
        }
    }
    None
}

/// Decode file bytes (after the BOM) to the internal UTF-8 form.
pub fn decode(data: &[u8], encoding: &Encoding) -> Vec<u8> {
    match encoding.kind {
        EncodingKind::Utf8 => data.to_vec(),
        EncodingKind::Utf16Be => unicode::utf16_to_utf8(data, true),
        EncodingKind::Utf16Le => unicode::utf16_to_utf8(data, false),
        EncodingKind::Utf32Be => unicode::utf32_to_utf8(data, true),
        EncodingKind::Utf32Le => unicode::utf32_to_utf8(data, false),
    }
}

/// Encode internal UTF-8 bytes for saving.
pub fn encode(data: &[u8], encoding: &Encoding) -> Vec<u8> {
    match encoding.kind {
        EncodingKind::Utf8 => data.to_vec(),
        EncodingKind::Utf16Be => unicode::utf8_to_utf16(data, true),
        EncodingKind::Utf16Le => unicode::utf8_to_utf16(data, false),
        EncodingKind::Utf32Be => unicode::utf8_to_utf32(data, true),
        EncodingKind::Utf32Le => unicode::utf8_to_utf32(data, false),
    }
}
