//! XChaCha20-Poly1305 authenticated encryption.
//!
//! Every credential the wallet persists is sealed with XChaCha20-Poly1305
//! under a 192-bit nonce drawn from OS entropy. Nonces must never repeat
//! under the same key; the 24-byte space makes random generation safe.

use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use rand::rngs::OsRng;
use rand::RngCore;

use parallel_types::{ParallelError, Result};

/// 192-bit nonce for XChaCha20-Poly1305.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AeadNonce([u8; AeadNonce::LEN]);

impl AeadNonce {
    /// Nonce length in bytes.
    pub const LEN: usize = 24;

    /// Wraps raw nonce bytes.
    pub fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    /// Borrows the nonce bytes.
    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }
}

/// Draws a fresh nonce from OS entropy.
pub fn generate_aead_nonce() -> AeadNonce {
    let mut bytes = [0u8; AeadNonce::LEN];
    OsRng.fill_bytes(&mut bytes);
    AeadNonce(bytes)
}

/// Encrypts `plaintext`, returning the ciphertext with the 16-byte Poly1305
/// tag appended.
///
/// # Errors
///
/// Returns [`ParallelError::SigningError`] if the cipher rejects the input.
pub fn encrypt_xchacha20(
    key: &[u8; 32],
    nonce: &AeadNonce,
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>> {
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key));
    let payload = Payload {
        msg: plaintext,
        aad,
    };
    cipher
        .encrypt(XNonce::from_slice(&nonce.0), payload)
        .map_err(|e| ParallelError::SigningError {
            reason: format!("aead encryption failed: {e}"),
        })
}

/// Decrypts ciphertext produced by [`encrypt_xchacha20`].
///
/// # Errors
///
/// Returns [`ParallelError::SigningError`] when tag verification fails:
/// wrong key, wrong nonce, mismatched AAD, or tampered ciphertext.
pub fn decrypt_xchacha20(
    key: &[u8; 32],
    nonce: &AeadNonce,
    ciphertext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>> {
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key));
    let payload = Payload {
        msg: ciphertext,
        aad,
    };
    cipher
        .decrypt(XNonce::from_slice(&nonce.0), payload)
        .map_err(|e| ParallelError::SigningError {
            reason: format!("aead decryption failed: {e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() -> std::result::Result<(), ParallelError> {
        let key = [0x42u8; 32];
        let nonce = generate_aead_nonce();
        let plaintext = b"private key material";

        let ciphertext = encrypt_xchacha20(&key, &nonce, plaintext, b"")?;
        assert_ne!(ciphertext.as_slice(), plaintext.as_slice());
        assert_eq!(ciphertext.len(), plaintext.len() + 16);

        let decrypted = decrypt_xchacha20(&key, &nonce, &ciphertext, b"")?;
        assert_eq!(decrypted.as_slice(), plaintext.as_slice());
        Ok(())
    }

    #[test]
    fn empty_plaintext_round_trip() -> std::result::Result<(), ParallelError> {
        let key = [0x01u8; 32];
        let nonce = generate_aead_nonce();
        let ciphertext = encrypt_xchacha20(&key, &nonce, b"", b"")?;
        assert_eq!(ciphertext.len(), 16);
        assert!(decrypt_xchacha20(&key, &nonce, &ciphertext, b"")?.is_empty());
        Ok(())
    }

    #[test]
    fn wrong_key_fails() -> std::result::Result<(), ParallelError> {
        let nonce = generate_aead_nonce();
        let ciphertext = encrypt_xchacha20(&[0x42; 32], &nonce, b"secret", b"")?;
        assert!(decrypt_xchacha20(&[0x43; 32], &nonce, &ciphertext, b"").is_err());
        Ok(())
    }

    #[test]
    fn wrong_nonce_fails() -> std::result::Result<(), ParallelError> {
        let key = [0x42u8; 32];
        let ciphertext = encrypt_xchacha20(&key, &generate_aead_nonce(), b"secret", b"")?;
        assert!(decrypt_xchacha20(&key, &generate_aead_nonce(), &ciphertext, b"").is_err());
        Ok(())
    }

    #[test]
    fn aad_mismatch_fails() -> std::result::Result<(), ParallelError> {
        let key = [0x42u8; 32];
        let nonce = generate_aead_nonce();
        let ciphertext = encrypt_xchacha20(&key, &nonce, b"secret", b"record:1")?;
        assert!(decrypt_xchacha20(&key, &nonce, &ciphertext, b"record:2").is_err());
        Ok(())
    }

    #[test]
    fn tampered_ciphertext_fails() -> std::result::Result<(), ParallelError> {
        let key = [0x42u8; 32];
        let nonce = generate_aead_nonce();
        let mut ciphertext = encrypt_xchacha20(&key, &nonce, b"secret", b"")?;
        ciphertext[0] ^= 0xff;
        assert!(decrypt_xchacha20(&key, &nonce, &ciphertext, b"").is_err());
        Ok(())
    }

    #[test]
    fn generated_nonces_differ() {
        assert_ne!(
            generate_aead_nonce().as_bytes(),
            generate_aead_nonce().as_bytes()
        );
    }
}
