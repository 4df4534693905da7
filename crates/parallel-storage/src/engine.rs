//! Core storage engine: database lifecycle, key management, and tree access.
//!
//! The [`StorageEngine`] owns the sled database and the encryption keys.
//! On [`open`](StorageEngine::open) it validates the master key length,
//! derives domain-separated sub-keys, opens the database, and pre-creates
//! every tree. Key material is zeroized on drop.

use std::path::Path;

use parallel_crypto::hkdf::expand_key;
use parallel_types::{ParallelError, Result};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::credentials::CredentialStore;
use crate::pending::PendingTxStore;
use crate::settings::SettingsStore;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Required master key length in bytes.
const KEY_LEN: usize = 32;

/// HKDF salt for deriving sub-keys from the master key.
const HKDF_SALT: &[u8] = b"Parallel-Store";

/// HKDF info for the encryption sub-key.
const HKDF_INFO_ENC: &[u8] = b"encryption";

/// HKDF info for the HMAC sub-key.
const HKDF_INFO_HMAC: &[u8] = b"hmac";

/// Trees created on open.
const TREES: [&str; 3] = ["credentials", "pending_txs", "settings"];

// ---------------------------------------------------------------------------
// DerivedKeys
// ---------------------------------------------------------------------------

/// Pair of domain-separated keys derived from the master key via HKDF.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct DerivedKeys {
    /// 32-byte key for XChaCha20-Poly1305 encryption.
    pub enc_key: [u8; 32],
    /// 32-byte key for HMAC-SHA256 authentication.
    pub hmac_key: [u8; 32],
}

impl DerivedKeys {
    fn derive(master_key: &[u8; 32]) -> Result<Self> {
        let enc_output = expand_key(master_key, Some(HKDF_SALT), HKDF_INFO_ENC, 32)?;
        let hmac_output = expand_key(master_key, Some(HKDF_SALT), HKDF_INFO_HMAC, 32)?;

        let mut enc_key = [0u8; 32];
        enc_key.copy_from_slice(enc_output.as_bytes());

        let mut hmac_key = [0u8; 32];
        hmac_key.copy_from_slice(hmac_output.as_bytes());

        Ok(Self { enc_key, hmac_key })
    }
}

// ---------------------------------------------------------------------------
// StorageEngine
// ---------------------------------------------------------------------------

/// Encrypted storage engine backed by sled.
///
/// All values stored through this engine are encrypted with
/// XChaCha20-Poly1305 and authenticated with HMAC-SHA256
/// (Encrypt-then-MAC). The master key is derived externally (the wallet
/// stretches its unlock secret through Argon2id) and passed to
/// [`open`](Self::open); the engine never generates keys itself.
///
/// # Trees
///
/// - `credentials` — private key, mnemonic, PIN hash
/// - `pending_txs` — transactions broadcast but not yet indexed
/// - `settings` — small key-value flags
pub struct StorageEngine {
    db: sled::Db,
    keys: DerivedKeys,
}

impl StorageEngine {
    /// Opens (or creates) the storage engine at `path`.
    ///
    /// # Errors
    ///
    /// - [`ParallelError::ConfigError`] if `master_key` is not exactly
    ///   32 bytes.
    /// - [`ParallelError::StorageUnavailable`] if the database cannot be
    ///   opened.
    pub fn open(path: &Path, master_key: &[u8]) -> Result<Self> {
        if master_key.len() != KEY_LEN {
            return Err(ParallelError::ConfigError {
                reason: format!(
                    "master key must be {KEY_LEN} bytes, got {}",
                    master_key.len()
                ),
            });
        }

        let mut master = [0u8; KEY_LEN];
        master.copy_from_slice(master_key);
        let keys = DerivedKeys::derive(&master)?;
        master.zeroize();

        let db = sled::open(path).map_err(|e| ParallelError::StorageUnavailable {
            reason: format!("failed to open sled database: {e}"),
        })?;

        // Pre-create all trees so they exist for later access.
        for name in &TREES {
            db.open_tree(name)
                .map_err(|e| ParallelError::StorageUnavailable {
                    reason: format!("failed to open tree '{name}': {e}"),
                })?;
        }

        Ok(Self { db, keys })
    }

    /// Flushes all pending writes to disk.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::StorageUnavailable`] if the flush fails.
    pub fn flush(&self) -> Result<()> {
        self.db
            .flush()
            .map_err(|e| ParallelError::StorageUnavailable {
                reason: format!("failed to flush database: {e}"),
            })?;
        Ok(())
    }

    pub(crate) fn keys(&self) -> &DerivedKeys {
        &self.keys
    }

    pub(crate) fn open_tree(&self, name: &str) -> Result<sled::Tree> {
        self.db
            .open_tree(name)
            .map_err(|e| ParallelError::StorageUnavailable {
                reason: format!("failed to open tree '{name}': {e}"),
            })
    }

    /// Returns the [`CredentialStore`] for this engine.
    pub fn credentials(&self) -> Result<CredentialStore<'_>> {
        CredentialStore::new(self)
    }

    /// Returns the [`PendingTxStore`] for this engine.
    pub fn pending_txs(&self) -> Result<PendingTxStore<'_>> {
        PendingTxStore::new(self)
    }

    /// Returns the [`SettingsStore`] for this engine.
    pub fn settings(&self) -> Result<SettingsStore<'_>> {
        SettingsStore::new(self)
    }
}
