//! Wei quantities and decimal unit conversion.
//!
//! All on-chain amounts (balances, fees, transfer values) are carried as
//! [`Wei`], an exact unsigned integer in the smallest unit. Display
//! strings are derivations and never flow back into arithmetic:
//!
//! - **Parsing**: user-entered decimal amounts scale up at a fixed
//!   per-token decimal count (18 everywhere on Rootstock).
//! - **Formatting**: integer part grouped with thousands separators;
//!   fractional part truncated to at most 6 digits and padded to at
//!   least 2. Truncation (not rounding) keeps the mapping pure integer
//!   math.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{ParallelError, Result};

/// Minimum fractional digits in a formatted amount.
const MIN_FRACTION_DIGITS: usize = 2;

/// Maximum fractional digits in a formatted amount.
const MAX_FRACTION_DIGITS: usize = 6;

// ---------------------------------------------------------------------------
// Wei
// ---------------------------------------------------------------------------

/// An exact chain quantity in the smallest unit (wei for the native
/// coin, token base units for ERC-20 amounts).
///
/// Backed by `u128`, which comfortably holds any 18-decimal balance this
/// wallet will see; RPC quantities that overflow it are rejected rather
/// than silently truncated.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Wei(u128);

impl Wei {
    /// Zero wei.
    pub const ZERO: Wei = Wei(0);

    /// Creates a quantity from a raw smallest-unit value.
    pub const fn new(raw: u128) -> Self {
        Self(raw)
    }

    /// Returns the raw smallest-unit value.
    pub fn as_u128(&self) -> u128 {
        self.0
    }

    /// Parses a `0x`-prefixed JSON-RPC quantity.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::RpcError`] on a missing prefix, invalid
    /// hex digits, or a value exceeding `u128`.
    pub fn from_hex_quantity(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| ParallelError::RpcError {
                reason: format!("quantity '{trimmed}' missing 0x prefix"),
            })?;
        if digits.is_empty() {
            return Err(ParallelError::RpcError {
                reason: "empty hex quantity".into(),
            });
        }
        let raw = u128::from_str_radix(digits, 16).map_err(|e| ParallelError::RpcError {
            reason: format!("invalid hex quantity '{trimmed}': {e}"),
        })?;
        Ok(Self(raw))
    }

    /// Encodes as a minimal `0x`-prefixed JSON-RPC quantity.
    pub fn to_hex_quantity(&self) -> String {
        format!("0x{:x}", self.0)
    }

    /// Checked addition.
    pub fn checked_add(&self, other: Wei) -> Option<Wei> {
        self.0.checked_add(other.0).map(Wei)
    }

    /// Checked multiplication by a gas amount.
    pub fn checked_mul_gas(&self, gas: u64) -> Option<Wei> {
        self.0.checked_mul(u128::from(gas)).map(Wei)
    }

    /// Parses a human decimal amount into smallest units.
    ///
    /// Accepts an optional single decimal point; the fractional part may
    /// not exceed `decimals` digits (no silent precision loss).
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::ConfigError`] on empty input, non-digit
    /// characters, excess fractional digits, or overflow.
    pub fn parse_units(amount: &str, decimals: u32) -> Result<Self> {
        let trimmed = amount.trim();
        if trimmed.is_empty() {
            return Err(ParallelError::ConfigError {
                reason: "empty amount".into(),
            });
        }

        let (int_part, frac_part) = match trimmed.split_once('.') {
            Some((i, f)) => (i, f),
            None => (trimmed, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(ParallelError::ConfigError {
                reason: "amount has no digits".into(),
            });
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ParallelError::ConfigError {
                reason: format!("amount '{trimmed}' contains non-digit characters"),
            });
        }
        if frac_part.len() > decimals as usize {
            return Err(ParallelError::ConfigError {
                reason: format!(
                    "amount '{trimmed}' has {} fractional digits, token allows {decimals}",
                    frac_part.len()
                ),
            });
        }

        let scale = 10u128
            .checked_pow(decimals)
            .ok_or_else(|| ParallelError::ConfigError {
                reason: format!("unsupported decimal count {decimals}"),
            })?;

        let int_value: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|e| ParallelError::ConfigError {
                reason: format!("amount '{trimmed}' integer part invalid: {e}"),
            })?
        };

        // Right-pad the fraction to `decimals` digits before parsing.
        let frac_value: u128 = if frac_part.is_empty() {
            0
        } else {
            let padded = format!("{frac_part:0<width$}", width = decimals as usize);
            padded.parse().map_err(|e| ParallelError::ConfigError {
                reason: format!("amount '{trimmed}' fractional part invalid: {e}"),
            })?
        };

        int_value
            .checked_mul(scale)
            .and_then(|v| v.checked_add(frac_value))
            .map(Wei)
            .ok_or_else(|| ParallelError::ConfigError {
                reason: format!("amount '{trimmed}' overflows the supported range"),
            })
    }

    /// Formats as a display decimal at the given decimal count.
    ///
    /// Integer part grouped with thousands separators; fraction
    /// truncated to [`MAX_FRACTION_DIGITS`] and padded to
    /// [`MIN_FRACTION_DIGITS`].
    pub fn format_units(&self, decimals: u32) -> String {
        let scale = 10u128.pow(decimals.min(38));
        let int_part = self.0 / scale;
        let frac_part = self.0 % scale;

        // Full fractional expansion, left-padded with zeros, then
        // truncated to the display maximum.
        let full_frac = format!("{frac_part:0>width$}", width = decimals as usize);
        let mut frac: String = full_frac.chars().take(MAX_FRACTION_DIGITS).collect();
        while frac.len() > MIN_FRACTION_DIGITS && frac.ends_with('0') {
            frac.pop();
        }
        while frac.len() < MIN_FRACTION_DIGITS {
            frac.push('0');
        }

        format!("{}.{frac}", group_thousands(int_part))
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Wei {
    type Err = ParallelError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim()
            .parse::<u128>()
            .map(Wei)
            .map_err(|e| ParallelError::ConfigError {
                reason: format!("invalid wei value '{s}': {e}"),
            })
    }
}

impl From<u128> for Wei {
    fn from(raw: u128) -> Self {
        Self(raw)
    }
}

impl From<u64> for Wei {
    fn from(raw: u64) -> Self {
        Self(u128::from(raw))
    }
}

impl Serialize for Wei {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Wei {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Groups a decimal integer with `,` every three digits.
fn group_thousands(value: u128) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_quantity_roundtrip() -> Result<()> {
        let wei = Wei::from_hex_quantity("0x38d7ea4c68000")?;
        assert_eq!(wei.as_u128(), 1_000_000_000_000_000);
        assert_eq!(wei.to_hex_quantity(), "0x38d7ea4c68000");
        Ok(())
    }

    #[test]
    fn hex_quantity_zero() -> Result<()> {
        let wei = Wei::from_hex_quantity("0x0")?;
        assert_eq!(wei, Wei::ZERO);
        assert_eq!(wei.to_hex_quantity(), "0x0");
        Ok(())
    }

    #[test]
    fn hex_quantity_rejects_missing_prefix() {
        assert!(Wei::from_hex_quantity("38d7ea4c68000").is_err());
        assert!(Wei::from_hex_quantity("0x").is_err());
        assert!(Wei::from_hex_quantity("0xzz").is_err());
    }

    #[test]
    fn parse_units_integer() -> Result<()> {
        let wei = Wei::parse_units("2000", 18)?;
        assert_eq!(wei.as_u128(), 2_000_000_000_000_000_000_000);
        Ok(())
    }

    #[test]
    fn parse_units_fraction() -> Result<()> {
        let wei = Wei::parse_units("1.25075", 18)?;
        assert_eq!(wei.as_u128(), 1_250_750_000_000_000_000);
        Ok(())
    }

    #[test]
    fn parse_units_leading_dot() -> Result<()> {
        let wei = Wei::parse_units(".5", 18)?;
        assert_eq!(wei.as_u128(), 500_000_000_000_000_000);
        Ok(())
    }

    #[test]
    fn parse_units_rejects_excess_precision() {
        // 19 fractional digits against an 18-decimal token.
        assert!(Wei::parse_units("1.0000000000000000001", 18).is_err());
    }

    #[test]
    fn parse_units_rejects_garbage() {
        assert!(Wei::parse_units("", 18).is_err());
        assert!(Wei::parse_units(".", 18).is_err());
        assert!(Wei::parse_units("1.2.3", 18).is_err());
        assert!(Wei::parse_units("-5", 18).is_err());
        assert!(Wei::parse_units("1e18", 18).is_err());
    }

    #[test]
    fn format_units_mock_native_balance() {
        // 1.25075 RBTC
        let wei = Wei::new(1_250_750_000_000_000_000);
        assert_eq!(wei.format_units(18), "1.25075");
    }

    #[test]
    fn format_units_mock_token_balance() {
        // 15,750 LUT
        let wei = Wei::new(15_750_000_000_000_000_000_000);
        assert_eq!(wei.format_units(18), "15,750.00");
    }

    #[test]
    fn format_units_pads_to_two_digits() {
        assert_eq!(Wei::new(5_000_000_000_000_000_000).format_units(18), "5.00");
        assert_eq!(Wei::ZERO.format_units(18), "0.00");
    }

    #[test]
    fn format_units_truncates_to_six_digits() {
        // 0.123456789... truncates, never rounds.
        let wei = Wei::new(123_456_789_012_345_678);
        assert_eq!(wei.format_units(18), "0.123456");
    }

    #[test]
    fn format_units_groups_thousands() {
        let wei = Wei::parse_units("1234567.5", 18).unwrap();
        assert_eq!(wei.format_units(18), "1,234,567.50");
    }

    #[test]
    fn parse_format_agree() -> Result<()> {
        let wei = Wei::parse_units("15750", 18)?;
        assert_eq!(wei.as_u128(), 15_750_000_000_000_000_000_000);
        assert_eq!(wei.format_units(18), "15,750.00");
        Ok(())
    }

    #[test]
    fn checked_mul_gas_exact() {
        let price = Wei::new(60_000_000);
        let total = price.checked_mul_gas(21_000).unwrap();
        assert_eq!(total.as_u128(), 21_000 * 60_000_000);
    }

    #[test]
    fn serde_as_decimal_string() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let wei = Wei::new(15_750_000_000_000_000_000_000);
        let json = serde_json::to_string(&wei)?;
        assert_eq!(json, "\"15750000000000000000000\"");
        let parsed: Wei = serde_json::from_str(&json)?;
        assert_eq!(wei, parsed);
        Ok(())
    }
}
