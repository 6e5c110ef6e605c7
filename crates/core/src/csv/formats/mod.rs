//! Per-format row mapping for the three supported brokerage layouts.

pub mod generic;
pub mod rakuten;
pub mod sbi;

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::holdings::{AccountType, NewHolding};

/// One logical CSV record, keyed by header label.
///
/// Missing trailing fields read as empty string.
pub type CsvRow = HashMap<String, String>;

lazy_static! {
    /// Pattern splitting a combined "code name" cell such as 「9104 商船三井」.
    static ref CODE_NAME_REGEX: Regex =
        Regex::new(r"^(\d{4})\s*(.*)$").expect("Invalid regex pattern");
}

/// Splits a combined stock-code/name cell into its parts.
///
/// Input that does not match the leading-4-digits shape is passed through
/// verbatim as the code with an empty name.
pub fn split_code_name(code_with_name: &str) -> (String, String) {
    match CODE_NAME_REGEX.captures(code_with_name) {
        Some(caps) => (caps[1].to_string(), caps[2].trim().to_string()),
        None => (code_with_name.to_string(), String::new()),
    }
}

/// Acquisition-price field as it appears in the export, before validation.
///
/// `Unknown` (a run of dashes in the cell) is distinct from `Empty`:
/// downstream consumers treat an explicit unknown price differently from a
/// price that was simply not provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawPrice {
    Empty,
    Unknown,
    Value(String),
}

/// Account-type field as produced by a mapper.
///
/// The generic layout carries a raw token that still needs validating; the
/// SBI and Rakuten mappers resolve the account type themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawAccount {
    Token(String),
    Resolved(AccountType),
}

/// Candidate holding produced by a format mapper, prior to validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldingDraft {
    pub stock_code: String,
    pub stock_name: String,
    pub shares: String,
    pub acquisition_price: RawPrice,
    pub account_type: RawAccount,
}

impl HoldingDraft {
    /// Converts a validated draft into a new holding.
    ///
    /// Callers run [`super::validation::validate_draft`] first; fields
    /// that still fail to parse here surface as validation errors rather
    /// than panics.
    pub fn into_holding(self) -> crate::Result<NewHolding> {
        let shares: i64 = self
            .shares
            .trim()
            .parse()
            .map_err(crate::errors::ValidationError::IntegerParse)?;

        let acquisition_price = match self.acquisition_price {
            RawPrice::Empty => None,
            RawPrice::Unknown => Some(None),
            RawPrice::Value(value) => Some(Some(value.trim().parse::<Decimal>()?)),
        };

        let account_type = match self.account_type {
            RawAccount::Resolved(account_type) => account_type,
            RawAccount::Token(token) => {
                AccountType::from_token(token.trim()).ok_or_else(|| {
                    crate::errors::ValidationError::InvalidInput(format!(
                        "unknown account type token: {token}"
                    ))
                })?
            }
        };

        let stock_name = match self.stock_name.trim() {
            "" => None,
            name => Some(name.to_string()),
        };

        Ok(NewHolding {
            stock_code: self.stock_code.trim().to_string(),
            stock_name,
            shares,
            acquisition_price,
            account_type,
        })
    }
}

/// Parseable CSV layout.
///
/// Unlike [`super::DetectedFormat`] this set is closed over the layouts the
/// pipeline can actually map; every variant has a mapper wired here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvFormat {
    Generic,
    Sbi,
    Rakuten,
}

impl CsvFormat {
    /// Maps a header-keyed row to a candidate holding.
    ///
    /// The SBI mapper is also reachable directly with its section account
    /// type; through this dispatcher it falls back to the specific account.
    pub fn map_row(&self, row: &CsvRow) -> HoldingDraft {
        match self {
            CsvFormat::Generic => generic::map_row(row),
            CsvFormat::Sbi => sbi::map_row(row, AccountType::Specific),
            CsvFormat::Rakuten => rakuten::map_row(row, None),
        }
    }

    /// Expected header labels for this layout.
    pub fn expected_headers(&self) -> &'static [&'static str] {
        match self {
            CsvFormat::Generic => &generic::GENERIC_HEADERS,
            CsvFormat::Sbi => &sbi::SBI_HEADERS,
            CsvFormat::Rakuten => &rakuten::RAKUTEN_HEADERS,
        }
    }
}
