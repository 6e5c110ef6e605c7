//! Business-rule validation for candidate holdings.
//!
//! Rules are format-agnostic: every mapper produces a [`HoldingDraft`] and
//! every draft flows through the same checks. All violated rules on a row
//! are collected together; validation never short-circuits.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::formats::{HoldingDraft, RawAccount, RawPrice};
use crate::holdings::AccountType;

lazy_static! {
    /// Stock codes on the Tokyo exchange are exactly four digits.
    static ref STOCK_CODE_REGEX: Regex = Regex::new(r"^\d{4}$").expect("Invalid regex pattern");
}

/// One business-rule violation, attached to a logical line.
///
/// Line numbers are 1-based; the header line counts as line 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvValidationError {
    pub line_number: usize,
    pub message: String,
}

impl CsvValidationError {
    pub fn new(line_number: usize, message: impl Into<String>) -> Self {
        Self {
            line_number,
            message: message.into(),
        }
    }
}

/// Whether a value is a well-formed 4-digit stock code.
pub fn is_valid_stock_code(value: &str) -> bool {
    STOCK_CODE_REGEX.is_match(value.trim())
}

/// Whether a value parses as a positive integer share count.
pub fn is_valid_shares(value: &str) -> bool {
    match value.trim().parse::<i64>() {
        Ok(shares) => shares > 0,
        Err(_) => false,
    }
}

/// Whether a value parses as a positive acquisition price.
pub fn is_valid_acquisition_price(value: &str) -> bool {
    match value.trim().parse::<Decimal>() {
        Ok(price) => price > Decimal::ZERO,
        Err(_) => false,
    }
}

/// Validates one candidate holding.
///
/// Returns every violated rule as its own error entry; an empty vec means
/// the draft passed.
pub fn validate_draft(draft: &HoldingDraft, line_number: usize) -> Vec<CsvValidationError> {
    let mut errors = Vec::new();

    if draft.stock_code.trim().is_empty() {
        errors.push(CsvValidationError::new(line_number, "銘柄コードは必須です。"));
    } else if !is_valid_stock_code(&draft.stock_code) {
        errors.push(CsvValidationError::new(
            line_number,
            "銘柄コードは4桁の数字で入力してください。",
        ));
    }

    if draft.shares.trim().is_empty() {
        errors.push(CsvValidationError::new(line_number, "保有株数は必須です。"));
    } else if !is_valid_shares(&draft.shares) {
        errors.push(CsvValidationError::new(
            line_number,
            "保有株数は正の整数で入力してください。",
        ));
    }

    // A missing price and an explicit unknown are both acceptable.
    if let RawPrice::Value(value) = &draft.acquisition_price {
        if !is_valid_acquisition_price(value) {
            errors.push(CsvValidationError::new(
                line_number,
                "取得単価は正の数値で入力してください。",
            ));
        }
    }

    if let RawAccount::Token(token) = &draft.account_type {
        if token.trim().is_empty() {
            errors.push(CsvValidationError::new(line_number, "口座種別は必須です。"));
        } else if AccountType::from_token(token.trim()).is_none() {
            errors.push(CsvValidationError::new(line_number, "口座種別が不正です。"));
        }
    }

    errors
}
