//! Keccak-256 hashing.
//!
//! Ethereum uses the original Keccak submission, not the padded FIPS-202
//! SHA3-256, so every digest in this workspace goes through [`keccak256`].

use sha3::{Digest, Keccak256};

/// Computes the Keccak-256 digest of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}
