//! Recoverable ECDSA signing on secp256k1.
//!
//! Every signature the wallet emits is the 65-byte `r || s || v` form.
//! [`sign_digest`] returns the raw parity bit; callers apply the offset
//! their context demands (27 for signed messages, `chain_id * 2 + 35` for
//! legacy transactions). Signatures are low-s normalized.

use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use zeroize::{Zeroize, ZeroizeOnDrop};

use parallel_types::{Address, ParallelError, Result};

use crate::address::pubkey_to_address;
use crate::hash::keccak256;

/// EIP-191 prefix for personal messages.
pub const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A secp256k1 private key, zeroized on drop.
///
/// Implements neither `Clone` nor `Debug`. The scalar leaves this type only
/// through [`PrivateKey::as_bytes`] and [`PrivateKey::to_hex`], both used by
/// the credential store when persisting the key under encryption.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; 32]);

impl PrivateKey {
    /// Key length in bytes.
    pub const LEN: usize = 32;

    /// Validates and wraps a raw scalar, taking ownership of the bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::SigningError`] when the scalar is zero or
    /// not below the curve order. The input is zeroized on failure.
    pub fn from_bytes(mut bytes: [u8; Self::LEN]) -> Result<Self> {
        match SigningKey::from_bytes(&bytes.into()) {
            Ok(_) => Ok(Self(bytes)),
            Err(e) => {
                bytes.zeroize();
                Err(ParallelError::SigningError {
                    reason: format!("invalid private key: {e}"),
                })
            }
        }
    }

    /// Parses a key from hex, with or without a `0x` prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::SigningError`] for non-hex input, a length
    /// other than 32 bytes, or an out-of-range scalar.
    pub fn from_hex(input: &str) -> Result<Self> {
        let stripped = input.strip_prefix("0x").unwrap_or(input);
        let mut raw = hex::decode(stripped).map_err(|e| ParallelError::SigningError {
            reason: format!("private key is not valid hex: {e}"),
        })?;
        if raw.len() != Self::LEN {
            raw.zeroize();
            return Err(ParallelError::SigningError {
                reason: format!("private key must be {} bytes", Self::LEN),
            });
        }
        let mut bytes = [0u8; Self::LEN];
        bytes.copy_from_slice(&raw);
        raw.zeroize();
        Self::from_bytes(bytes)
    }

    /// Borrows the raw scalar.
    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    /// Encodes the scalar as 0x-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Returns the uncompressed SEC1 public key (65 bytes, leading `0x04`).
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::SigningError`] if the scalar fails to load,
    /// which construction already rules out.
    pub fn public_key_uncompressed(&self) -> Result<[u8; 65]> {
        let signing_key = self.signing_key()?;
        let point = signing_key.verifying_key().to_encoded_point(false);
        let mut bytes = [0u8; 65];
        bytes.copy_from_slice(point.as_bytes());
        Ok(bytes)
    }

    /// Computes the Ethereum address controlled by this key.
    ///
    /// # Errors
    ///
    /// Same as [`PrivateKey::public_key_uncompressed`].
    pub fn address(&self) -> Result<Address> {
        pubkey_to_address(&self.public_key_uncompressed()?)
    }

    fn signing_key(&self) -> Result<SigningKey> {
        SigningKey::from_bytes(&self.0.into()).map_err(|e| ParallelError::SigningError {
            reason: format!("invalid private key: {e}"),
        })
    }
}

/// A recoverable ECDSA signature split into its wire components.
///
/// `recovery_id` is the raw parity bit (0 or 1), not an Ethereum `v` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoverableSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub recovery_id: u8,
}

impl RecoverableSignature {
    /// Encodes as the 0x-prefixed 65-byte `r || s || v` hex string used for
    /// signed messages and typed data, with `v = 27 + recovery_id`.
    pub fn to_rsv_hex(&self) -> String {
        let mut out = Vec::with_capacity(65);
        out.extend_from_slice(&self.r);
        out.extend_from_slice(&self.s);
        out.push(27 + self.recovery_id);
        format!("0x{}", hex::encode(out))
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Signs a 32-byte digest, returning the low-s normalized signature and its
/// recovery bit.
///
/// # Errors
///
/// Returns [`ParallelError::SigningError`] if the key fails to load or the
/// signing operation itself fails.
pub fn sign_digest(key: &PrivateKey, digest: &[u8; 32]) -> Result<RecoverableSignature> {
    let signing_key = key.signing_key()?;
    let (signature, recovery_id) =
        signing_key
            .sign_prehash_recoverable(digest)
            .map_err(|e| ParallelError::SigningError {
                reason: format!("signing failed: {e}"),
            })?;
    let bytes = signature.to_bytes();
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&bytes[..32]);
    s.copy_from_slice(&bytes[32..]);
    Ok(RecoverableSignature {
        r,
        s,
        recovery_id: recovery_id.to_byte(),
    })
}

/// Recovers the signer address from a digest and signature.
///
/// # Errors
///
/// Returns [`ParallelError::SigningError`] for an out-of-range recovery id,
/// a malformed signature, or a failed recovery.
pub fn recover_address(digest: &[u8; 32], signature: &RecoverableSignature) -> Result<Address> {
    let recovery_id = RecoveryId::from_byte(signature.recovery_id).ok_or_else(|| {
        ParallelError::SigningError {
            reason: format!("invalid recovery id {}", signature.recovery_id),
        }
    })?;
    let mut raw = [0u8; 64];
    raw[..32].copy_from_slice(&signature.r);
    raw[32..].copy_from_slice(&signature.s);
    let parsed = EcdsaSignature::from_slice(&raw).map_err(|e| ParallelError::SigningError {
        reason: format!("invalid signature: {e}"),
    })?;
    let verifying_key = VerifyingKey::recover_from_prehash(digest, &parsed, recovery_id).map_err(
        |e| ParallelError::SigningError {
            reason: format!("address recovery failed: {e}"),
        },
    )?;
    let point = verifying_key.to_encoded_point(false);
    let mut uncompressed = [0u8; 65];
    uncompressed.copy_from_slice(point.as_bytes());
    pubkey_to_address(&uncompressed)
}

/// Computes the EIP-191 digest of a personal message:
/// `keccak256("\x19Ethereum Signed Message:\n" || len || message)`.
pub fn personal_message_digest(message: &[u8]) -> [u8; 32] {
    let length = message.len().to_string();
    let mut buffer =
        Vec::with_capacity(PERSONAL_MESSAGE_PREFIX.len() + length.len() + message.len());
    buffer.extend_from_slice(PERSONAL_MESSAGE_PREFIX.as_bytes());
    buffer.extend_from_slice(length.as_bytes());
    buffer.extend_from_slice(message);
    keccak256(&buffer)
}

/// Signs a personal message and returns the `r || s || v` hex signature.
///
/// # Errors
///
/// Same as [`sign_digest`].
pub fn personal_sign(key: &PrivateKey, message: &[u8]) -> Result<String> {
    let digest = personal_message_digest(message);
    Ok(sign_digest(key, &digest)?.to_rsv_hex())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known development key; account zero of the standard test mnemonic.
    const DEV_KEY_HEX: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS_HEX: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

    fn dev_key() -> PrivateKey {
        PrivateKey::from_hex(DEV_KEY_HEX).unwrap()
    }

    #[test]
    fn key_derives_known_address() -> std::result::Result<(), ParallelError> {
        let address = dev_key().address()?;
        assert_eq!(address.to_string(), DEV_ADDRESS_HEX);
        Ok(())
    }

    #[test]
    fn hex_round_trip_preserves_key() -> std::result::Result<(), ParallelError> {
        let key = dev_key();
        let reparsed = PrivateKey::from_hex(&key.to_hex())?;
        assert_eq!(key.as_bytes(), reparsed.as_bytes());
        Ok(())
    }

    #[test]
    fn prefix_is_optional_when_parsing() -> std::result::Result<(), ParallelError> {
        let bare = DEV_KEY_HEX.trim_start_matches("0x");
        let key = PrivateKey::from_hex(bare)?;
        assert_eq!(key.to_hex(), DEV_KEY_HEX);
        Ok(())
    }

    #[test]
    fn zero_and_oversized_scalars_rejected() {
        assert!(PrivateKey::from_bytes([0u8; 32]).is_err());
        assert!(PrivateKey::from_bytes([0xff; 32]).is_err());
        assert!(PrivateKey::from_hex("0xdeadbeef").is_err());
        assert!(PrivateKey::from_hex("not hex").is_err());
    }

    #[test]
    fn signature_recovers_to_signer() -> std::result::Result<(), ParallelError> {
        let key = dev_key();
        let digest = keccak256(b"governance payload");
        let signature = sign_digest(&key, &digest)?;
        assert!(signature.recovery_id < 2);
        let recovered = recover_address(&digest, &signature)?;
        assert_eq!(recovered, key.address()?);
        Ok(())
    }

    #[test]
    fn rsv_encoding_is_sixty_five_bytes_with_offset_v() -> std::result::Result<(), ParallelError>
    {
        let digest = keccak256(b"encode me");
        let signature = sign_digest(&dev_key(), &digest)?;
        let encoded = signature.to_rsv_hex();
        assert_eq!(encoded.len(), 2 + 65 * 2);
        let v = &encoded[encoded.len() - 2..];
        assert!(v == "1b" || v == "1c", "unexpected v byte {v}");
        Ok(())
    }

    #[test]
    fn personal_digest_prefixes_length_and_message() {
        let message = b"hello";
        let mut expected = Vec::new();
        expected.extend_from_slice(b"\x19Ethereum Signed Message:\n5");
        expected.extend_from_slice(message);
        assert_eq!(personal_message_digest(message), keccak256(&expected));
    }

    #[test]
    fn personal_sign_verifies_against_signer() -> std::result::Result<(), ParallelError> {
        let key = dev_key();
        let message = b"Sign in to Parallel Society Governance\nNonce: 12345";
        let encoded = personal_sign(&key, message)?;
        assert_eq!(encoded.len(), 132);

        let raw = hex::decode(encoded.trim_start_matches("0x")).unwrap();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&raw[..32]);
        s.copy_from_slice(&raw[32..64]);
        let signature = RecoverableSignature {
            r,
            s,
            recovery_id: raw[64] - 27,
        };
        let recovered = recover_address(&personal_message_digest(message), &signature)?;
        assert_eq!(recovered, key.address()?);
        Ok(())
    }

    #[test]
    fn signing_is_deterministic() -> std::result::Result<(), ParallelError> {
        let key = dev_key();
        let digest = keccak256(b"rfc 6979");
        assert_eq!(sign_digest(&key, &digest)?, sign_digest(&key, &digest)?);
        Ok(())
    }
}
