use std::borrow::Cow;

use encoding_rs::GBK;

/// Text encodings tried, in order, when reading file contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    /// GBK, a superset of GB2312.
    Gbk,
    /// ISO-8859-1: every byte maps to the code point of the same value.
    Latin1,
}

impl TextEncoding {
    /// The fallback chain. The last entry accepts any input.
    pub const CHAIN: [TextEncoding; 3] = [TextEncoding::Utf8, TextEncoding::Gbk, TextEncoding::Latin1];

    /// Strict decode; `None` means the bytes are malformed in this encoding.
    pub fn decode(self, bytes: &[u8]) -> Option<Cow<'_, str>> {
        match self {
            TextEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(Cow::Borrowed),
            TextEncoding::Gbk => GBK.decode_without_bom_handling_and_without_replacement(bytes),
            TextEncoding::Latin1 => Some(Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect())),
        }
    }
}

/// Decode `bytes` with the first encoding in [`TextEncoding::CHAIN`] that
/// accepts them. Never fails.
pub fn decode_text(bytes: &[u8]) -> (Cow<'_, str>, TextEncoding) {
    for enc in TextEncoding::CHAIN {
        if let Some(text) = enc.decode(bytes) {
            return (text, enc);
        }
    }
    // Latin-1 is total, so the chain always returns above.
    (Cow::Owned(String::new()), TextEncoding::Latin1)
}

/// Heuristic binary check: a NUL byte near the start of the file.
pub fn looks_binary(bytes: &[u8]) -> bool {
    const SNIFF_LEN: usize = 8 * 1024;
    bytes[..bytes.len().min(SNIFF_LEN)].contains(&0)
}
