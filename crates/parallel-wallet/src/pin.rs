//! Six-digit PIN validation and hashing.
//!
//! The PIN never touches disk. What the credential store keeps is
//! `keccak256(pin_utf8)` as a `0x`-prefixed hex string; verification
//! recomputes the digest and compares.

use parallel_crypto::keccak256;
use parallel_types::{ParallelError, Result};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Required PIN length in digits.
pub const PIN_LEN: usize = 6;

/// A validated six-digit wallet PIN.
///
/// Holds the digits only until dropped; implements neither `Clone` nor
/// `Debug`.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Pin(String);

impl Pin {
    /// Validates user input as a PIN.
    ///
    /// Surrounding whitespace is ignored; the remainder must be exactly
    /// [`PIN_LEN`] ASCII digits.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::ConfigError`] on any other shape.
    pub fn new(input: &str) -> Result<Self> {
        let digits = input.trim();
        if digits.len() != PIN_LEN || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ParallelError::ConfigError {
                reason: format!("PIN must be exactly {PIN_LEN} digits"),
            });
        }
        Ok(Self(digits.to_string()))
    }

    /// Returns the digest stored at rest: `0x` + hex of
    /// `keccak256(pin_utf8)`.
    pub fn digest_hex(&self) -> String {
        format!("0x{}", hex::encode(keccak256(self.0.as_bytes())))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
