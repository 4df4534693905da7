//! Output formatting for human-readable and JSON modes.
//!
//! Human mode uses colored terminal output.
//! JSON mode outputs pure JSON with no ANSI escapes.

use chrono::{TimeZone, Utc};
use colored::Colorize;
use serde::Serialize;

use parallel_types::{Address, TokenKind, Wei};

/// Prints a success message with an optional value.
pub fn print_success(msg: &str, json_mode: bool) {
    if json_mode {
        let obj = serde_json::json!({ "status": "ok", "message": msg });
        println!("{}", obj);
    } else {
        println!("{} {}", "✓".green().bold(), msg);
    }
}

/// Prints a single key-value pair.
pub fn print_kv(key: &str, value: &str, json_mode: bool) {
    if json_mode {
        let obj = serde_json::json!({ key: value });
        println!("{}", obj);
    } else {
        println!("{}: {}", key.bold(), value);
    }
}

/// Prints a serializable value as JSON or a pretty-printed form.
pub fn print_value<T: Serialize>(value: &T, json_mode: bool) {
    if json_mode {
        match serde_json::to_string(value) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("{{\"error\":\"json serialization failed: {e}\"}}"),
        }
    } else {
        match serde_json::to_string_pretty(value) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("Error formatting output: {e}"),
        }
    }
}

/// Prints an error message.
pub fn print_error(msg: &str, json_mode: bool) {
    if json_mode {
        let obj = serde_json::json!({ "error": msg });
        eprintln!("{}", obj);
    } else {
        eprintln!("{} {}", "error:".red().bold(), msg);
    }
}

/// Prints a table of rows in human mode, JSON array in JSON mode.
pub fn print_table(headers: &[&str], rows: &[Vec<String>], json_mode: bool) {
    if json_mode {
        let arr: Vec<serde_json::Value> = rows
            .iter()
            .map(|row| {
                let mut obj = serde_json::Map::new();
                for (i, h) in headers.iter().enumerate() {
                    let val = row.get(i).cloned().unwrap_or_default();
                    obj.insert(h.to_string(), serde_json::Value::String(val));
                }
                serde_json::Value::Object(obj)
            })
            .collect();
        println!("{}", serde_json::Value::Array(arr));
        return;
    }

    // Human-readable table.
    if rows.is_empty() {
        println!("{}", "(no results)".dimmed());
        return;
    }

    // Calculate column widths.
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() && cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }

    // Print header.
    let header_line: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:<w$}", h.to_uppercase(), w = widths[i]))
        .collect();
    println!("{}", header_line.join("  ").bold());

    // Print separator.
    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    println!("{}", sep.join("  ").dimmed());

    // Print rows.
    for row in rows {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{:<w$}", cell, w = w)
            })
            .collect();
        println!("{}", line.join("  "));
    }
}

// ---------------------------------------------------------------------------
// Argument parsing helpers
// ---------------------------------------------------------------------------

/// Parses a token symbol (`rbtc` or `lut`, case-insensitive).
pub fn parse_token(s: &str) -> std::result::Result<TokenKind, String> {
    s.parse::<TokenKind>().map_err(|e| e.to_string())
}

/// Parses a 0x-prefixed hex address.
pub fn parse_address(s: &str) -> std::result::Result<Address, String> {
    s.parse::<Address>().map_err(|e| e.to_string())
}

/// Parses a whole-token decimal amount (e.g. `"1.5"`) into raw units.
pub fn parse_amount(s: &str, token: TokenKind) -> std::result::Result<Wei, String> {
    Wei::parse_units(s, token.decimals()).map_err(|e| e.to_string())
}

/// Truncates a long hex string to its first 12 chars for display.
pub fn truncate_id(id: &str) -> String {
    if id.len() > 16 {
        format!("{}...", &id[..12])
    } else {
        id.to_string()
    }
}

/// Formats UTC milliseconds as `YYYY-MM-DD HH:MM`.
pub fn fmt_time(timestamp_ms: i64) -> String {
    match Utc.timestamp_millis_opt(timestamp_ms).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => "-".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_parse_at_token_decimals() {
        assert_eq!(
            parse_amount("1.5", TokenKind::Rbtc).unwrap(),
            Wei::new(1_500_000_000_000_000_000)
        );
        assert_eq!(parse_amount("0", TokenKind::Lut).unwrap(), Wei::ZERO);
        assert!(parse_amount("1,5", TokenKind::Rbtc).is_err());
        assert!(parse_amount("", TokenKind::Rbtc).is_err());
    }

    #[test]
    fn token_symbols_parse_case_insensitively() {
        assert_eq!(parse_token("RBTC").unwrap(), TokenKind::Rbtc);
        assert_eq!(parse_token("lut").unwrap(), TokenKind::Lut);
        assert!(parse_token("doge").is_err());
    }

    #[test]
    fn addresses_require_twenty_bytes() {
        assert!(parse_address("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").is_ok());
        assert!(parse_address("0x1234").is_err());
    }

    #[test]
    fn long_ids_truncate_for_display() {
        let hash = format!("0x{}", "ab".repeat(32));
        assert_eq!(truncate_id(&hash), "0xababababab...");
        assert_eq!(truncate_id("0x1234"), "0x1234");
    }

    #[test]
    fn timestamps_render_as_utc_minutes() {
        assert_eq!(fmt_time(0), "1970-01-01 00:00");
        assert_eq!(fmt_time(1_700_000_000_000), "2023-11-14 22:13");
    }
}
