use std::{fs, path::Path};

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};

/// Decoded file text plus the name of the encoding it was read as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding_name: String,
}

pub fn read_text(path: &Path) -> std::io::Result<DecodedText> {
    let bytes = fs::read(path)?;
    Ok(decode_text(&bytes))
}

/// Honours byte-order marks, then tries UTF-8, then falls back to
/// Windows-1252 for legacy files.
pub fn decode_text(bytes: &[u8]) -> DecodedText {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return decode_with_encoding(&bytes[3..], UTF_8);
    }
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return decode_with_encoding(&bytes[2..], UTF_16LE);
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return decode_with_encoding(&bytes[2..], UTF_16BE);
    }

    if let Ok(as_utf8) = std::str::from_utf8(bytes) {
        return DecodedText {
            text: as_utf8.to_string(),
            encoding_name: UTF_8.name().to_string(),
        };
    }

    decode_with_encoding(bytes, WINDOWS_1252)
}

fn decode_with_encoding(bytes: &[u8], encoding: &'static Encoding) -> DecodedText {
    let (text, _) = encoding.decode_without_bom_handling(bytes);
    DecodedText {
        text: text.into_owned(),
        encoding_name: encoding.name().to_string(),
    }
}
