//! Generic encrypted sled tree wrapper.
//!
//! [`EncryptedTree<T>`] transparently encrypts values on write and decrypts
//! on read. Every stored value follows the Encrypt-then-MAC pattern:
//!
//! ```text
//! [nonce 24B] [ciphertext variable] [hmac 32B]
//! ```
//!
//! On read, the HMAC is verified **before** any decryption attempt.

use parallel_crypto::aead::{decrypt_xchacha20, encrypt_xchacha20, generate_aead_nonce, AeadNonce};
use parallel_crypto::mac::{hmac_sha256, verify_hmac_sha256};
use parallel_types::{ParallelError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::engine::DerivedKeys;

/// Size of the XChaCha20-Poly1305 nonce.
const NONCE_LEN: usize = AeadNonce::LEN;

/// Size of the HMAC-SHA256 tag.
const HMAC_LEN: usize = 32;

/// Minimum stored value size: nonce + AEAD tag (16) + HMAC.
const MIN_VALUE_LEN: usize = NONCE_LEN + 16 + HMAC_LEN;

/// A sled tree where every value is encrypted and HMAC-authenticated.
///
/// `T` must implement `Serialize` and `DeserializeOwned` for bincode
/// serialization.
pub struct EncryptedTree<'a, T> {
    tree: sled::Tree,
    keys: &'a DerivedKeys,
    _marker: std::marker::PhantomData<T>,
}

impl<'a, T> EncryptedTree<'a, T>
where
    T: Serialize + DeserializeOwned,
{
    pub(crate) fn new(tree: sled::Tree, keys: &'a DerivedKeys) -> Self {
        Self {
            tree,
            keys,
            _marker: std::marker::PhantomData,
        }
    }

    /// Retrieves and decrypts a value by key. Returns `Ok(None)` if the key
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::StorageUnavailable`] if the stored value is
    /// malformed, fails authentication, or fails to decrypt.
    pub fn get(&self, key: &[u8]) -> Result<Option<T>> {
        let raw = self
            .tree
            .get(key)
            .map_err(|e| ParallelError::StorageUnavailable {
                reason: format!("sled get failed: {e}"),
            })?;

        match raw {
            None => Ok(None),
            Some(bytes) => Ok(Some(self.decrypt_value(&bytes)?)),
        }
    }

    /// Serializes, encrypts, and inserts a value. A fresh 24-byte nonce is
    /// generated for each write.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::StorageUnavailable`] if serialization,
    /// encryption, or the sled insert fails.
    pub fn insert(&self, key: &[u8], value: &T) -> Result<()> {
        let encrypted = self.encrypt_value(value)?;
        self.tree
            .insert(key, encrypted)
            .map_err(|e| ParallelError::StorageUnavailable {
                reason: format!("sled insert failed: {e}"),
            })?;
        Ok(())
    }

    /// Removes a key. Returns `Ok(true)` if the key existed.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::StorageUnavailable`] if the sled remove
    /// fails.
    pub fn delete(&self, key: &[u8]) -> Result<bool> {
        let prev = self
            .tree
            .remove(key)
            .map_err(|e| ParallelError::StorageUnavailable {
                reason: format!("sled remove failed: {e}"),
            })?;
        Ok(prev.is_some())
    }

    /// Iterates all entries, decrypting each value. Any entry that fails
    /// authentication aborts the iteration with an error.
    pub fn iter(&self) -> Result<Vec<(Vec<u8>, T)>> {
        let mut results = Vec::new();
        for item in self.tree.iter() {
            let (key, value) = item.map_err(|e| ParallelError::StorageUnavailable {
                reason: format!("sled iter failed: {e}"),
            })?;
            results.push((key.to_vec(), self.decrypt_value(&value)?));
        }
        Ok(results)
    }

    /// Removes every entry in the tree.
    pub fn clear(&self) -> Result<()> {
        self.tree
            .clear()
            .map_err(|e| ParallelError::StorageUnavailable {
                reason: format!("sled clear failed: {e}"),
            })
    }

    // -- Internal ----------------------------------------------------------

    /// serialize → encrypt → HMAC → pack as `[nonce][ciphertext][hmac]`.
    fn encrypt_value(&self, value: &T) -> Result<Vec<u8>> {
        let plaintext =
            bincode::serialize(value).map_err(|e| ParallelError::StorageUnavailable {
                reason: format!("bincode serialization failed: {e}"),
            })?;

        let nonce = generate_aead_nonce();
        let ciphertext = encrypt_xchacha20(&self.keys.enc_key, &nonce, &plaintext, &[])
            .map_err(storage_crypto_error)?;

        let mut hmac_input = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        hmac_input.extend_from_slice(nonce.as_bytes());
        hmac_input.extend_from_slice(&ciphertext);
        let hmac_tag =
            hmac_sha256(&self.keys.hmac_key, &hmac_input).map_err(storage_crypto_error)?;

        let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len() + HMAC_LEN);
        output.extend_from_slice(nonce.as_bytes());
        output.extend_from_slice(&ciphertext);
        output.extend_from_slice(&hmac_tag);
        Ok(output)
    }

    /// unpack → HMAC verify → decrypt → deserialize.
    fn decrypt_value(&self, raw: &[u8]) -> Result<T> {
        if raw.len() < MIN_VALUE_LEN {
            return Err(ParallelError::StorageUnavailable {
                reason: format!(
                    "stored value too short: expected at least {MIN_VALUE_LEN} bytes, got {}",
                    raw.len()
                ),
            });
        }

        let mut nonce_bytes = [0u8; NONCE_LEN];
        nonce_bytes.copy_from_slice(&raw[..NONCE_LEN]);
        let nonce = AeadNonce::from_bytes(nonce_bytes);

        let hmac_start = raw.len() - HMAC_LEN;
        let mut hmac_expected = [0u8; HMAC_LEN];
        hmac_expected.copy_from_slice(&raw[hmac_start..]);

        let ciphertext = &raw[NONCE_LEN..hmac_start];

        // Authenticate before any decryption work.
        let mut hmac_input = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        hmac_input.extend_from_slice(&nonce_bytes);
        hmac_input.extend_from_slice(ciphertext);
        verify_hmac_sha256(&self.keys.hmac_key, &hmac_input, &hmac_expected).map_err(|_| {
            ParallelError::StorageUnavailable {
                reason: "stored value failed authentication".to_string(),
            }
        })?;

        let plaintext = decrypt_xchacha20(&self.keys.enc_key, &nonce, ciphertext, &[])
            .map_err(storage_crypto_error)?;

        bincode::deserialize(&plaintext).map_err(|e| ParallelError::StorageUnavailable {
            reason: format!("bincode deserialization failed: {e}"),
        })
    }
}

fn storage_crypto_error(err: ParallelError) -> ParallelError {
    ParallelError::StorageUnavailable {
        reason: err.to_string(),
    }
}
