//! SBI証券 multi-section layout.
//!
//! The document alternates section headers (each naming an account type),
//! a data-header line, data rows, and summary rows. The section/summary/
//! data-header predicates here drive the state machine in the parser.

use super::{split_code_name, CsvRow, HoldingDraft, RawAccount, RawPrice};
use crate::holdings::AccountType;

/// Data-header column labels for the domestic-stock section.
pub const SBI_HEADERS: [&str; 10] = [
    "銘柄（コード）",
    "取得日",
    "保有数",
    "取得単価",
    "現在値",
    "前日比",
    "前日比（％）",
    "損益",
    "損益（％）",
    "評価額",
];

/// Section-label substrings mapped to account types, checked in order.
const SBI_ACCOUNT_TYPE_MAP: [(&str, AccountType); 4] = [
    ("特定/一般口座", AccountType::Specific),
    ("NISA口座(成長投資枠)", AccountType::NisaGrowth),
    ("NISA口座(つみたて投資枠)", AccountType::NisaTsumitate),
    ("つみたてNISA口座", AccountType::NisaLegacy),
];

/// Price cell placeholder meaning "acquisition price unknown".
const UNKNOWN_PRICE_TOKEN: &str = "----";

/// Whether a first cell starts a new account-type section.
pub fn is_section_header(first_cell: &str) -> bool {
    first_cell.starts_with("国内株式(") || first_cell.starts_with("投資信託(")
}

/// Whether a first cell is a per-section or grand total row.
pub fn is_summary_row(first_cell: &str) -> bool {
    if first_cell.is_empty() {
        return false;
    }
    first_cell.ends_with("合計") || first_cell == "総合計"
}

/// Whether a first cell is a data-header line (stock or fund section).
pub fn is_data_header(first_cell: &str) -> bool {
    first_cell == "銘柄（コード）" || first_cell == "ファンド名"
}

/// Extracts the account type announced by a section header.
///
/// Defaults to the specific account when no label matches.
pub fn extract_account_type(section_header: &str) -> AccountType {
    for (pattern, account_type) in SBI_ACCOUNT_TYPE_MAP {
        if section_header.contains(pattern) {
            return account_type;
        }
    }
    AccountType::Specific
}

fn cell<'a>(row: &'a CsvRow, key: &str) -> &'a str {
    row.get(key).map(String::as_str).unwrap_or("").trim()
}

/// Maps an SBI data row to a candidate holding.
///
/// The account type comes from the currently active section, tracked by
/// the parser; a `----` price cell is an explicit unknown, not an absent
/// value.
pub fn map_row(row: &CsvRow, account_type: AccountType) -> HoldingDraft {
    let (stock_code, stock_name) = split_code_name(cell(row, "銘柄（コード）"));

    let acquisition_price = match cell(row, "取得単価") {
        "" => RawPrice::Empty,
        UNKNOWN_PRICE_TOKEN => RawPrice::Unknown,
        value => RawPrice::Value(value.to_string()),
    };

    HoldingDraft {
        stock_code,
        stock_name,
        shares: cell(row, "保有数").to_string(),
        acquisition_price,
        account_type: RawAccount::Resolved(account_type),
    }
}
