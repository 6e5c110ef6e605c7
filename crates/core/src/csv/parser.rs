//! Parse driver: turns decoded CSV text into candidate holdings.
//!
//! Row-level problems never abort the document; they are collected next to
//! the rows that did succeed, so the caller can show a preview with both.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::detect_format::detect_format;
use super::encoding::{decode, detect_encoding};
use super::formats::{sbi, CsvFormat, CsvRow};
use super::tokenizer::{parse_fields, split_lines};
use super::validation::{validate_draft, CsvValidationError};
use crate::errors::ValidationError;
use crate::holdings::{AccountType, NewHolding};
use crate::Result;

lazy_static! {
    /// First-cell shape of an SBI data row: a 4-digit code then whitespace.
    static ref SBI_DATA_ROW_REGEX: Regex = Regex::new(r"^\d{4}\s").expect("Invalid regex pattern");
}

/// Outcome of parsing one uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvParseResult {
    /// Holdings that mapped and validated successfully.
    pub holdings: Vec<NewHolding>,
    /// Row-level errors, in document order.
    pub errors: Vec<CsvValidationError>,
}

/// Parses decoded CSV text in the given layout.
///
/// A leading BOM is stripped here (the decoder keeps it). Logical lines are
/// numbered from 1 with the header line counting as line 1.
pub fn parse_csv(content: &str, format: CsvFormat) -> CsvParseResult {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let lines = split_lines(content);

    match format {
        CsvFormat::Sbi => parse_sections(&lines),
        CsvFormat::Generic | CsvFormat::Rakuten => parse_single_header(&lines, format),
    }
}

/// The assembled front half of the import pipeline:
/// bytes → encoding detection → decode → format detection → parse.
///
/// An unrecognized layout is a validation error; the caller maps it to a
/// 400-class response.
pub fn parse_holdings_file(bytes: &[u8]) -> Result<CsvParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode(bytes, encoding);

    let format = detect_format(&content).to_format().ok_or_else(|| {
        ValidationError::InvalidInput(
            "CSVのフォーマットを認識できません。対応形式のファイルを選択してください。".to_string(),
        )
    })?;

    Ok(parse_csv(&content, format))
}

fn build_row(headers: &[String], values: &[String]) -> CsvRow {
    let mut row = CsvRow::with_capacity(headers.len());
    for (j, header) in headers.iter().enumerate() {
        let value = values.get(j).cloned().unwrap_or_default();
        row.insert(header.clone(), value);
    }
    row
}

fn push_row_outcome(
    draft: super::formats::HoldingDraft,
    line_number: usize,
    holdings: &mut Vec<NewHolding>,
    errors: &mut Vec<CsvValidationError>,
) {
    let row_errors = validate_draft(&draft, line_number);
    if !row_errors.is_empty() {
        errors.extend(row_errors);
        return;
    }

    match draft.into_holding() {
        Ok(holding) => holdings.push(holding),
        Err(err) => errors.push(CsvValidationError::new(line_number, err.to_string())),
    }
}

/// Single-header layouts: first non-blank line names the columns, every
/// following non-blank line is a data row.
fn parse_single_header(lines: &[String], format: CsvFormat) -> CsvParseResult {
    let mut holdings = Vec::new();
    let mut errors = Vec::new();
    let mut headers: Option<Vec<String>> = None;

    for (idx, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let values = parse_fields(line);
        match headers {
            None => headers = Some(values),
            Some(ref headers) => {
                let row = build_row(headers, &values);
                push_row_outcome(format.map_row(&row), idx + 1, &mut holdings, &mut errors);
            }
        }
    }

    CsvParseResult { holdings, errors }
}

/// SBI multi-section layout: a state machine over section headers, data
/// headers, data rows, and summary rows.
///
/// `looking_for_data` turns on at a section or data-header line; while on,
/// a line whose first cell matches the 4-digit-code-plus-space shape is a
/// data row under the currently active account type. Summary rows and
/// anything else are silently skipped.
fn parse_sections(lines: &[String]) -> CsvParseResult {
    let mut holdings = Vec::new();
    let mut errors = Vec::new();

    let mut current_account = AccountType::Specific;
    let mut looking_for_data = false;
    let mut headers: Option<Vec<String>> = None;

    for (idx, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let values = parse_fields(line);
        let first_cell = values.first().map(String::as_str).unwrap_or("");

        // Section summaries share the section-header prefix, so rule them
        // out before the header checks.
        if sbi::is_summary_row(first_cell) {
            continue;
        }

        if sbi::is_section_header(first_cell) {
            current_account = sbi::extract_account_type(first_cell);
            looking_for_data = true;
            headers = None;
            continue;
        }

        if sbi::is_data_header(first_cell) {
            headers = Some(values);
            looking_for_data = true;
            continue;
        }

        if !looking_for_data || !SBI_DATA_ROW_REGEX.is_match(first_cell) {
            continue;
        }

        let row = match &headers {
            Some(headers) => build_row(headers, &values),
            // Data row before any data header: fall back to the default
            // stock-section columns.
            None => {
                let defaults: Vec<String> =
                    sbi::SBI_HEADERS.iter().map(|h| h.to_string()).collect();
                build_row(&defaults, &values)
            }
        };

        push_row_outcome(
            sbi::map_row(&row, current_account),
            idx + 1,
            &mut holdings,
            &mut errors,
        );
    }

    CsvParseResult { holdings, errors }
}
