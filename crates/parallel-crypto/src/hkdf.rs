//! HKDF-SHA256 subkey expansion.
//!
//! The credential store never encrypts with the Argon2 output directly.
//! Each purpose (cipher key, authentication key) gets its own subkey via
//! [`expand_key`] with a distinct `info` string.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use parallel_types::{ParallelError, Result};

/// Largest subkey this module will produce.
pub const MAX_OUTPUT_LEN: usize = 64;

/// Expanded key material, zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct HkdfOutput {
    bytes: Vec<u8>,
}

impl HkdfOutput {
    /// Borrows the expanded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Expands `ikm` into `output_len` bytes bound to `info`.
///
/// # Errors
///
/// Returns [`ParallelError::ConfigError`] when `output_len` is zero or above
/// [`MAX_OUTPUT_LEN`], and [`ParallelError::SigningError`] if expansion
/// fails.
pub fn expand_key(
    ikm: &[u8],
    salt: Option<&[u8]>,
    info: &[u8],
    output_len: usize,
) -> Result<HkdfOutput> {
    if output_len == 0 || output_len > MAX_OUTPUT_LEN {
        return Err(ParallelError::ConfigError {
            reason: format!("hkdf output length must be 1..={MAX_OUTPUT_LEN}, got {output_len}"),
        });
    }
    let hkdf = Hkdf::<Sha256>::new(salt, ikm);
    let mut bytes = vec![0u8; output_len];
    hkdf.expand(info, &mut bytes)
        .map_err(|e| ParallelError::SigningError {
            reason: format!("hkdf expansion failed: {e}"),
        })?;
    Ok(HkdfOutput { bytes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc_5869_test_case_one() -> std::result::Result<(), ParallelError> {
        let ikm = [0x0b; 22];
        let salt = hex::decode("000102030405060708090a0b0c").unwrap();
        let info = hex::decode("f0f1f2f3f4f5f6f7f8f9").unwrap();
        let okm = expand_key(&ikm, Some(&salt), &info, 42)?;
        assert_eq!(
            hex::encode(okm.as_bytes()),
            "3cb25f25faacd57a90434f64d0362f2a2d2d0a90cf1a5a4c5db02d56ecc4c5bf34007208d5b887185865"
        );
        Ok(())
    }

    #[test]
    fn info_separates_subkeys() -> std::result::Result<(), ParallelError> {
        let cipher = expand_key(b"master", None, b"cipher", 32)?;
        let auth = expand_key(b"master", None, b"auth", 32)?;
        assert_ne!(cipher.as_bytes(), auth.as_bytes());
        Ok(())
    }

    #[test]
    fn output_length_bounds_enforced() {
        assert!(expand_key(b"master", None, b"x", 0).is_err());
        assert!(expand_key(b"master", None, b"x", MAX_OUTPUT_LEN + 1).is_err());
        assert!(expand_key(b"master", None, b"x", MAX_OUTPUT_LEN).is_ok());
    }
}
