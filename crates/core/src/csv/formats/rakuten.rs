//! 楽天証券 layout: single header line, account type carried per row.

use super::{split_code_name, CsvRow, HoldingDraft, RawAccount, RawPrice};
use crate::holdings::AccountType;

/// Header column labels for the Rakuten layout.
pub const RAKUTEN_HEADERS: [&str; 8] = [
    "銘柄",
    "口座",
    "保有数量",
    "平均取得価額",
    "現在値",
    "時価評価額",
    "評価損益",
    "評価損益率",
];

/// Account-cell substrings mapped to account types, checked in order.
const RAKUTEN_ACCOUNT_TYPE_MAP: [(&str, AccountType); 4] = [
    ("特定", AccountType::Specific),
    ("NISA成長投資枠", AccountType::NisaGrowth),
    ("NISAつみたて投資枠", AccountType::NisaTsumitate),
    ("つみたてNISA", AccountType::NisaLegacy),
];

/// Price cell placeholder meaning "acquisition price unknown".
const UNKNOWN_PRICE_TOKEN: &str = "----";

/// Whether a line is a Rakuten header line.
///
/// Contains a bare 「銘柄」 token while excluding the SBI bracketed variant
/// and the generic 「銘柄コード」, together with an account or quantity
/// token. Quotes are stripped before matching.
pub fn is_rakuten_header(line: &str) -> bool {
    if line.is_empty() {
        return false;
    }

    let normalized = line.replace('"', "");

    if normalized.contains("銘柄")
        && !normalized.contains("銘柄（コード）")
        && !normalized.contains("銘柄コード")
    {
        return normalized.contains("口座") || normalized.contains("保有数量");
    }

    false
}

/// Extracts the account type from the row's 「口座」 cell.
///
/// Defaults to the specific account when no label matches.
pub fn extract_account_type(account_cell: &str) -> AccountType {
    for (pattern, account_type) in RAKUTEN_ACCOUNT_TYPE_MAP {
        if account_cell.contains(pattern) {
            return account_type;
        }
    }
    AccountType::Specific
}

fn cell<'a>(row: &'a CsvRow, key: &str) -> &'a str {
    row.get(key).map(String::as_str).unwrap_or("").trim()
}

/// Maps a Rakuten row to a candidate holding.
///
/// An upstream account-type override (from a section-aware caller) wins
/// over the row's own account cell. A `----` price cell is an explicit
/// unknown, distinct from an empty cell which maps to absent.
pub fn map_row(row: &CsvRow, account_override: Option<AccountType>) -> HoldingDraft {
    let (stock_code, stock_name) = split_code_name(cell(row, "銘柄"));

    let account_type = match account_override {
        Some(account_type) => account_type,
        None => extract_account_type(cell(row, "口座")),
    };

    let acquisition_price = match cell(row, "平均取得価額") {
        "" => RawPrice::Empty,
        UNKNOWN_PRICE_TOKEN => RawPrice::Unknown,
        value => RawPrice::Value(value.to_string()),
    };

    HoldingDraft {
        stock_code,
        stock_name,
        shares: cell(row, "保有数量").to_string(),
        acquisition_price,
        account_type: RawAccount::Resolved(account_type),
    }
}
