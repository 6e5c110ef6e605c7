//! Generic five-column layout: one header line, one data line per holding.

use super::{CsvRow, HoldingDraft, RawAccount, RawPrice};

/// Expected headers for the generic layout.
pub const GENERIC_HEADERS: [&str; 5] = ["銘柄コード", "銘柄名", "保有株数", "取得単価", "口座種別"];

fn cell<'a>(row: &'a CsvRow, key: &str) -> &'a str {
    row.get(key).map(String::as_str).unwrap_or("").trim()
}

/// Maps a generic-layout row to a candidate holding.
///
/// Empty optional cells map to "absent", never to zero or empty string.
pub fn map_row(row: &CsvRow) -> HoldingDraft {
    let acquisition_price = match cell(row, "取得単価") {
        "" => RawPrice::Empty,
        value => RawPrice::Value(value.to_string()),
    };

    HoldingDraft {
        stock_code: cell(row, "銘柄コード").to_string(),
        stock_name: cell(row, "銘柄名").to_string(),
        shares: cell(row, "保有株数").to_string(),
        acquisition_price,
        account_type: RawAccount::Token(cell(row, "口座種別").to_string()),
    }
}
