//! Multi-encoding decode ladder (§4.1 step 1). Ordered exactly as
//! `original_source/agents/ingestion_agent.py`'s `encodings` list.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEncoding {
    Utf8,
    Utf8Bom,
    Latin1,
    Cp1252,
    Utf16,
}

impl FileEncoding {
    pub const LADDER: [FileEncoding; 5] = [
        FileEncoding::Utf8,
        FileEncoding::Utf8Bom,
        FileEncoding::Latin1,
        FileEncoding::Cp1252,
        FileEncoding::Utf16,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileEncoding::Utf8 => "utf-8",
            FileEncoding::Utf8Bom => "utf-8-sig",
            FileEncoding::Latin1 => "latin1",
            FileEncoding::Cp1252 => "cp1252",
            FileEncoding::Utf16 => "utf-16",
        }
    }

    /// Decode `bytes` with this encoding. Returns `None` if the bytes are not valid
    /// for it (e.g. UTF-8 decode of non-UTF-8 bytes).
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        let decoded = match self {
            FileEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(|s| s.to_string()),
            FileEncoding::Utf8Bom => {
                let stripped = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
                std::str::from_utf8(stripped).ok().map(|s| s.to_string())
            }
            FileEncoding::Latin1 => {
                // ISO-8859-1 is a total 1:1 byte->codepoint mapping; every byte
                // sequence is valid, so this never fails.
                Some(bytes.iter().map(|&b| b as char).collect())
            }
            FileEncoding::Cp1252 => {
                let (decoded, _, had_errors) = encoding_rs::WINDOWS_1252.decode(bytes);
                if had_errors {
                    None
                } else {
                    Some(decoded.into_owned())
                }
            }
            FileEncoding::Utf16 => {
                let (encoding, bom_len) = encoding_rs::Encoding::for_bom(bytes)
                    .unwrap_or((encoding_rs::UTF_16LE, 0));
                if encoding != encoding_rs::UTF_16LE && encoding != encoding_rs::UTF_16BE {
                    return None;
                }
                let (decoded, _, had_errors) = encoding.decode(&bytes[bom_len..]);
                if had_errors {
                    None
                } else {
                    Some(decoded.into_owned())
                }
            }
        };
        // A byte-order-mark decodes to a leading U+FEFF regardless of which
        // candidate encoding matched first (plain `Utf8` happily accepts
        // `EF BB BF` as valid UTF-8, so `Utf8Bom` never gets a turn). Strip it
        // here so every encoding in the ladder returns BOM-free text.
        decoded.map(|s| s.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_decodes_plain_ascii() {
        let bytes = b"sr_number,region\nA,Karachi\n";
        assert_eq!(
            FileEncoding::Utf8.decode(bytes).unwrap(),
            "sr_number,region\nA,Karachi\n"
        );
    }

    #[test]
    fn latin1_never_fails() {
        let bytes: Vec<u8> = (0..=255u8).collect();
        assert!(FileEncoding::Latin1.decode(&bytes).is_some());
    }

    #[test]
    fn utf8_rejects_invalid_bytes() {
        let bytes = [0xFF, 0xFE, 0x00];
        assert!(FileEncoding::Utf8.decode(&bytes).is_none());
    }

    #[test]
    fn utf8_strips_leading_bom_even_though_it_is_valid_utf8() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"sr_number,region\nA,Karachi\n");
        let decoded = FileEncoding::Utf8.decode(&bytes).unwrap();
        assert_eq!(decoded, "sr_number,region\nA,Karachi\n");
        assert!(!decoded.starts_with('\u{feff}'));
    }
}
