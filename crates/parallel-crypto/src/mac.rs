//! HMAC-SHA256 tags for tamper detection.
//!
//! The credential store authenticates every encrypted record before it
//! attempts decryption (Encrypt-then-MAC). Verification is constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use parallel_types::{ParallelError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Tag length in bytes.
pub const HMAC_SHA256_LEN: usize = 32;

/// Computes HMAC-SHA256 over `data`.
///
/// # Errors
///
/// Returns [`ParallelError::SigningError`] if key setup fails, which
/// HMAC-SHA256 only does for pathological key inputs.
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<[u8; HMAC_SHA256_LEN]> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|e| ParallelError::SigningError {
        reason: format!("hmac key setup failed: {e}"),
    })?;
    mac.update(data);
    let result = mac.finalize().into_bytes();
    let mut output = [0u8; HMAC_SHA256_LEN];
    output.copy_from_slice(&result);
    Ok(output)
}

/// Verifies a tag in constant time.
///
/// # Errors
///
/// Returns [`ParallelError::SigningError`] when the tag does not match.
pub fn verify_hmac_sha256(key: &[u8], data: &[u8], expected: &[u8; HMAC_SHA256_LEN]) -> Result<()> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|e| ParallelError::SigningError {
        reason: format!("hmac key setup failed: {e}"),
    })?;
    mac.update(data);
    mac.verify_slice(expected)
        .map_err(|_| ParallelError::SigningError {
            reason: "hmac tag mismatch".to_string(),
        })
}
