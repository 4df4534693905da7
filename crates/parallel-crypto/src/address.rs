//! Ethereum address derivation and EIP-55 checksum formatting.

use parallel_types::{Address, ParallelError, Result};

use crate::hash::keccak256;

/// Derives the address from an uncompressed SEC1 public key: the last 20
/// bytes of `keccak256(pubkey[1..])`.
///
/// # Errors
///
/// Returns [`ParallelError::SigningError`] if the key does not carry the
/// uncompressed `0x04` tag.
pub fn pubkey_to_address(uncompressed: &[u8; 65]) -> Result<Address> {
    if uncompressed[0] != 0x04 {
        return Err(ParallelError::SigningError {
            reason: "public key must be in uncompressed SEC1 form".to_string(),
        });
    }
    let digest = keccak256(&uncompressed[1..]);
    let mut bytes = [0u8; Address::LEN];
    bytes.copy_from_slice(&digest[12..]);
    Ok(Address::new(bytes))
}

/// Formats an address with the EIP-55 mixed-case checksum.
///
/// A hex letter is uppercased when the corresponding nibble of
/// `keccak256(lowercase_hex)` is 8 or above.
pub fn to_eip55(address: &Address) -> String {
    let lower = hex::encode(address.as_bytes());
    let digest = keccak256(lower.as_bytes());
    let mut out = String::with_capacity(2 + lower.len());
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let shift = if i % 2 == 0 { 4 } else { 0 };
        let nibble = (digest[i / 2] >> shift) & 0x0f;
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}
