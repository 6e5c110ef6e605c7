//! CSV tokenization: logical-line splitting and field splitting.
//!
//! Both scanners carry an `in_quotes` flag so that RFC-4180-style quoted
//! values survive intact: a quoted field may contain commas, doubled
//! quotes (`""` reads as one literal quote), and embedded newlines, which
//! means a single logical row can span multiple physical lines.

/// Splits CSV content into logical lines.
///
/// A newline only terminates the current line outside quotes; inside
/// quotes it is kept as part of the field. Quote characters (including
/// `""` escapes) are preserved verbatim so [`parse_fields`] can unquote.
pub fn split_lines(content: &str) -> Vec<String> {
    let chars: Vec<char> = content.chars().collect();
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];

        if in_quotes {
            if ch == '"' {
                if i + 1 < chars.len() && chars[i + 1] == '"' {
                    current.push_str("\"\"");
                    i += 2;
                    continue;
                }
                in_quotes = false;
                current.push(ch);
                i += 1;
                continue;
            }
            current.push(ch);
            i += 1;
        } else {
            match ch {
                '"' => {
                    in_quotes = true;
                    current.push(ch);
                    i += 1;
                }
                '\n' => {
                    lines.push(std::mem::take(&mut current));
                    i += 1;
                }
                '\r' => {
                    // \r\n counts as one terminator
                    if i + 1 < chars.len() && chars[i + 1] == '\n' {
                        i += 1;
                    }
                    lines.push(std::mem::take(&mut current));
                    i += 1;
                }
                _ => {
                    current.push(ch);
                    i += 1;
                }
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// Splits one logical line into fields.
///
/// Commas outside quotes delimit fields; `""` inside quotes collapses to
/// one literal quote; each field is trimmed of surrounding whitespace; the
/// terminal field is emitted even without a trailing delimiter.
pub fn parse_fields(line: &str) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];

        if in_quotes {
            if ch == '"' {
                if i + 1 < chars.len() && chars[i + 1] == '"' {
                    current.push('"');
                    i += 2;
                    continue;
                }
                in_quotes = false;
                i += 1;
                continue;
            }
            current.push(ch);
            i += 1;
        } else {
            match ch {
                '"' => {
                    in_quotes = true;
                    i += 1;
                }
                ',' => {
                    fields.push(current.trim().to_string());
                    current.clear();
                    i += 1;
                }
                _ => {
                    current.push(ch);
                    i += 1;
                }
            }
        }
    }

    fields.push(current.trim().to_string());

    fields
}
