//! Layout classification from the first meaningful line of a decoded file.

use super::formats::{generic, rakuten, sbi, CsvFormat};

/// Classification result for an uploaded file.
///
/// `Unknown` means no supported layout matched; callers surface that as a
/// validation failure instead of guessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedFormat {
    Generic,
    Sbi,
    Rakuten,
    Unknown,
}

impl DetectedFormat {
    /// The parseable format for this detection result, if any.
    pub fn to_format(self) -> Option<CsvFormat> {
        match self {
            DetectedFormat::Generic => Some(CsvFormat::Generic),
            DetectedFormat::Sbi => Some(CsvFormat::Sbi),
            DetectedFormat::Rakuten => Some(CsvFormat::Rakuten),
            DetectedFormat::Unknown => None,
        }
    }
}

/// Detects which brokerage layout the decoded text is in.
///
/// Blank lines and SBI section-header lines are skipped; the first
/// remaining content line decides the outcome. SBI detection takes
/// priority over Rakuten when both token sets could match.
pub fn detect_format(content: &str) -> DetectedFormat {
    if content.trim().is_empty() {
        return DetectedFormat::Unknown;
    }

    let normalized = content.replace("\r\n", "\n").replace('\r', "\n");

    for line in normalized.split('\n') {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        // A section header announces the multi-section layout without being
        // usable as a header line itself; keep scanning for the data header.
        if sbi::is_section_header(trimmed) {
            continue;
        }

        let first_cell = trimmed
            .split(',')
            .next()
            .unwrap_or("")
            .trim_start_matches('"')
            .trim_end_matches('"');
        if sbi::is_data_header(first_cell) {
            return DetectedFormat::Sbi;
        }

        if trimmed.contains(sbi::SBI_HEADERS[0]) {
            return DetectedFormat::Sbi;
        }

        if trimmed.contains(generic::GENERIC_HEADERS[0]) {
            return DetectedFormat::Generic;
        }

        if rakuten::is_rakuten_header(trimmed) {
            return DetectedFormat::Rakuten;
        }

        // The first content line decides; anything unrecognized here means
        // the whole document is unknown.
        return DetectedFormat::Unknown;
    }

    DetectedFormat::Unknown
}
