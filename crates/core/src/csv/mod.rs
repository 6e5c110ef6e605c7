//! Brokerage CSV import pipeline, front half: bytes to candidate holdings.

mod detect_format;
mod encoding;
pub mod formats;
mod parser;
mod tokenizer;
mod validation;

pub use detect_format::{detect_format, DetectedFormat};
pub use encoding::{decode, detect_encoding, Encoding};
pub use formats::{CsvFormat, CsvRow, HoldingDraft, RawAccount, RawPrice};
pub use parser::{parse_csv, parse_holdings_file, CsvParseResult};
pub use tokenizer::{parse_fields, split_lines};
pub use validation::{validate_draft, CsvValidationError};
