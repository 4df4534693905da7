//! BIP-32 hierarchical key derivation on secp256k1.
//!
//! Wallet accounts live at the Ethereum convention path `m/44'/60'/0'/0/0`.
//! Hardened children are derived from the parent private key, normal
//! children from the compressed parent public key, both through
//! HMAC-SHA512 keyed with the parent chain code.

use hmac::{Hmac, Mac};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::{Field, PrimeField};
use k256::{Scalar, SecretKey};
use sha2::Sha512;
use zeroize::{Zeroize, ZeroizeOnDrop};

use parallel_types::{ParallelError, Result};

use crate::mnemonic::Seed;
use crate::signing::PrivateKey;

type HmacSha512 = Hmac<Sha512>;

/// First hardened index. Segments at or above this value require the parent
/// private key.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// HMAC key for master key derivation, fixed by BIP-32.
const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

/// Account zero derivation path used for every wallet in this workspace.
pub const WALLET_DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A private extended key: the scalar plus the chain code that keys child
/// derivation. Both halves are zeroized on drop; the type implements neither
/// `Clone` nor `Debug`.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ExtendedKey {
    key: [u8; 32],
    chain_code: [u8; 32],
}

impl ExtendedKey {
    /// Borrows the private key scalar.
    pub fn key_bytes(&self) -> &[u8; 32] {
        &self.key
    }

    /// Borrows the chain code.
    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    /// Converts this node into a bare signing key, discarding the chain
    /// code.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::SigningError`] if the scalar is not a valid
    /// secp256k1 private key, which derivation already rules out.
    pub fn into_private_key(self) -> Result<PrivateKey> {
        PrivateKey::from_bytes(self.key)
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Derives the BIP-32 master key from seed bytes.
///
/// # Errors
///
/// Returns [`ParallelError::SigningError`] when the seed length is outside
/// the 16..=64 byte range BIP-32 permits, or in the negligible case that the
/// HMAC output is not a usable scalar.
pub fn master_key_from_seed(seed: &[u8]) -> Result<ExtendedKey> {
    if seed.len() < 16 || seed.len() > 64 {
        return Err(ParallelError::SigningError {
            reason: format!("seed must be 16..=64 bytes, got {}", seed.len()),
        });
    }
    let mut i = hmac_sha512(MASTER_HMAC_KEY, seed)?;
    let mut key = [0u8; 32];
    let mut chain_code = [0u8; 32];
    key.copy_from_slice(&i[..32]);
    chain_code.copy_from_slice(&i[32..]);
    i.zeroize();

    let scalar = scalar_from_bytes(&key)?;
    if bool::from(scalar.is_zero()) {
        key.zeroize();
        return Err(ParallelError::SigningError {
            reason: "master key derivation produced a zero scalar".to_string(),
        });
    }
    Ok(ExtendedKey { key, chain_code })
}

/// Derives one child node. Indices at or above [`HARDENED_OFFSET`] use the
/// hardened scheme.
///
/// # Errors
///
/// Returns [`ParallelError::SigningError`] if the tweak falls outside the
/// curve order or the resulting key is zero. BIP-32 assigns both cases
/// probability below 2^-127; callers treat them as hard failures rather than
/// skipping to the next index.
pub fn derive_child(parent: &ExtendedKey, index: u32) -> Result<ExtendedKey> {
    let mut data = Vec::with_capacity(37);
    if index >= HARDENED_OFFSET {
        data.push(0x00);
        data.extend_from_slice(&parent.key);
    } else {
        let secret = SecretKey::from_slice(&parent.key).map_err(|e| {
            ParallelError::SigningError {
                reason: format!("invalid parent key: {e}"),
            }
        })?;
        let point = secret.public_key().to_encoded_point(true);
        data.extend_from_slice(point.as_bytes());
    }
    data.extend_from_slice(&index.to_be_bytes());

    let mut i = hmac_sha512(&parent.chain_code, &data)?;
    data.zeroize();

    let mut il = [0u8; 32];
    let mut chain_code = [0u8; 32];
    il.copy_from_slice(&i[..32]);
    chain_code.copy_from_slice(&i[32..]);
    i.zeroize();

    let tweak = scalar_from_bytes(&il);
    il.zeroize();
    let child = tweak? + scalar_from_bytes(&parent.key)?;
    if bool::from(child.is_zero()) {
        return Err(ParallelError::SigningError {
            reason: "child key derivation produced a zero scalar".to_string(),
        });
    }

    let mut key = [0u8; 32];
    key.copy_from_slice(&child.to_bytes());
    Ok(ExtendedKey { key, chain_code })
}

/// Walks a full derivation path from seed bytes.
///
/// # Errors
///
/// Returns [`ParallelError::SigningError`] for malformed paths or any
/// derivation failure along the way.
pub fn derive_path(seed: &[u8], path: &str) -> Result<ExtendedKey> {
    let indices = parse_derivation_path(path)?;
    let mut node = master_key_from_seed(seed)?;
    for index in indices {
        node = derive_child(&node, index)?;
    }
    Ok(node)
}

/// Derives the account-zero signing key at [`WALLET_DERIVATION_PATH`].
///
/// # Errors
///
/// Returns [`ParallelError::SigningError`] on any derivation failure.
pub fn derive_wallet_key(seed: &Seed) -> Result<PrivateKey> {
    derive_path(seed.as_bytes(), WALLET_DERIVATION_PATH)?.into_private_key()
}

/// Parses a `m/44'/60'/...` path into child indices, with the hardened bit
/// already applied. Both `'` and `h` mark hardened segments.
///
/// # Errors
///
/// Returns [`ParallelError::SigningError`] if the path does not start with
/// `m`, a segment is empty or non-numeric, or a raw index has the hardened
/// bit set.
pub fn parse_derivation_path(path: &str) -> Result<Vec<u32>> {
    let mut parts = path.split('/');
    if parts.next() != Some("m") {
        return Err(ParallelError::SigningError {
            reason: format!("derivation path must start with 'm': {path}"),
        });
    }
    let mut indices = Vec::new();
    for part in parts {
        let (digits, hardened) = match part.strip_suffix('\'').or_else(|| part.strip_suffix('h')) {
            Some(stripped) => (stripped, true),
            None => (part, false),
        };
        let index: u32 = digits.parse().map_err(|_| ParallelError::SigningError {
            reason: format!("invalid path segment '{part}' in {path}"),
        })?;
        if index >= HARDENED_OFFSET {
            return Err(ParallelError::SigningError {
                reason: format!("path index {index} out of range in {path}"),
            });
        }
        indices.push(if hardened { index | HARDENED_OFFSET } else { index });
    }
    Ok(indices)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn hmac_sha512(key: &[u8], data: &[u8]) -> Result<[u8; 64]> {
    let mut mac = HmacSha512::new_from_slice(key).map_err(|e| ParallelError::SigningError {
        reason: format!("hmac key setup failed: {e}"),
    })?;
    mac.update(data);
    let output = mac.finalize().into_bytes();
    let mut bytes = [0u8; 64];
    bytes.copy_from_slice(&output);
    Ok(bytes)
}

fn scalar_from_bytes(bytes: &[u8; 32]) -> Result<Scalar> {
    Option::<Scalar>::from(Scalar::from_repr((*bytes).into())).ok_or_else(|| {
        ParallelError::SigningError {
            reason: "derived bytes exceed the curve order".to_string(),
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
