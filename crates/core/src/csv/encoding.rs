//! Byte-encoding detection and decoding for uploaded CSV files.
//!
//! Japanese brokerages export either UTF-8 or Shift-JIS; nothing else is
//! seen in the wild, so detection is a closed two-way classification.

use encoding_rs::SHIFT_JIS;

/// Encoding of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    ShiftJis,
}

/// UTF-8 byte-order-mark (EF BB BF).
const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Checks whether the buffer is structurally valid UTF-8.
///
/// Lead bytes matching the 2/3/4-byte prefixes must be followed by exactly
/// 1/2/3 continuation bytes (`10xxxxxx`); anything else rejects the buffer.
fn is_valid_utf8(bytes: &[u8]) -> bool {
    let mut i = 0;
    while i < bytes.len() {
        let byte = bytes[i];

        let continuation_count = if byte <= 0x7F {
            // ASCII
            0
        } else if byte & 0xE0 == 0xC0 {
            1
        } else if byte & 0xF0 == 0xE0 {
            2
        } else if byte & 0xF8 == 0xF0 {
            3
        } else {
            // Stray continuation byte or invalid lead byte
            return false;
        };

        if i + continuation_count >= bytes.len() {
            return false;
        }
        for offset in 1..=continuation_count {
            if bytes[i + offset] & 0xC0 != 0x80 {
                return false;
            }
        }
        i += continuation_count + 1;
    }
    true
}

/// Classifies a raw byte buffer as UTF-8 or Shift-JIS.
///
/// A BOM or a structurally valid UTF-8 buffer is classified as UTF-8;
/// everything else is Shift-JIS. This is a heuristic: a Shift-JIS buffer
/// that happens to be byte-wise valid UTF-8 will be misclassified.
pub fn detect_encoding(bytes: &[u8]) -> Encoding {
    if bytes.len() >= 3 && bytes[..3] == UTF8_BOM {
        return Encoding::Utf8;
    }

    if is_valid_utf8(bytes) {
        return Encoding::Utf8;
    }

    Encoding::ShiftJis
}

/// Decodes a byte buffer into a string using the given encoding.
///
/// The UTF-8 path keeps a leading BOM in the output; stripping it is the
/// parser's job, not the decoder's. Malformed input degrades to replacement
/// characters instead of failing the pipeline.
pub fn decode(bytes: &[u8], encoding: Encoding) -> String {
    match encoding {
        Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        Encoding::ShiftJis => {
            let (decoded, _, _) = SHIFT_JIS.decode(bytes);
            decoded.into_owned()
        }
    }
}
