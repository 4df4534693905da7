//! Signing credential store.
//!
//! Holds the three secrets behind a wallet: the derived private key, the
//! recovery phrase, and the PIN hash. Every key in the tree carries the
//! `parallel_` namespace prefix.

use parallel_crypto::mnemonic::Mnemonic;
use parallel_crypto::signing::PrivateKey;
use parallel_types::Result;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::encrypted_tree::EncryptedTree;
use crate::engine::StorageEngine;

const KEY_PRIVATE_KEY: &str = "parallel_private_key";
const KEY_MNEMONIC: &str = "parallel_mnemonic";
const KEY_PIN_HASH: &str = "parallel_pin_hash";

/// Wrapper for one stored secret string, zeroized on drop.
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
struct SecretRecord {
    value: String,
}

/// Encrypted store for wallet credentials.
pub struct CredentialStore<'a> {
    tree: EncryptedTree<'a, SecretRecord>,
}

impl<'a> CredentialStore<'a> {
    pub(crate) fn new(engine: &'a StorageEngine) -> Result<Self> {
        let sled_tree = engine.open_tree("credentials")?;
        Ok(Self {
            tree: EncryptedTree::new(sled_tree, engine.keys()),
        })
    }

    /// Persists the signing key as 0x-prefixed hex.
    pub fn store_private_key(&self, key: &PrivateKey) -> Result<()> {
        self.tree.insert(
            KEY_PRIVATE_KEY.as_bytes(),
            &SecretRecord {
                value: key.to_hex(),
            },
        )
    }

    /// Loads the signing key, if one is stored.
    pub fn private_key(&self) -> Result<Option<PrivateKey>> {
        match self.tree.get(KEY_PRIVATE_KEY.as_bytes())? {
            Some(record) => Ok(Some(PrivateKey::from_hex(&record.value)?)),
            None => Ok(None),
        }
    }

    /// Persists the recovery phrase.
    pub fn store_mnemonic(&self, mnemonic: &Mnemonic) -> Result<()> {
        self.tree.insert(
            KEY_MNEMONIC.as_bytes(),
            &SecretRecord {
                value: mnemonic.as_str().to_string(),
            },
        )
    }

    /// Loads and revalidates the recovery phrase, if one is stored.
    pub fn mnemonic(&self) -> Result<Option<Mnemonic>> {
        match self.tree.get(KEY_MNEMONIC.as_bytes())? {
            Some(record) => Ok(Some(Mnemonic::from_phrase(&record.value)?)),
            None => Ok(None),
        }
    }

    /// Persists the PIN digest (hex).
    pub fn store_pin_hash(&self, hash: &str) -> Result<()> {
        self.tree.insert(
            KEY_PIN_HASH.as_bytes(),
            &SecretRecord {
                value: hash.to_string(),
            },
        )
    }

    /// Loads the PIN digest, if one is stored.
    pub fn pin_hash(&self) -> Result<Option<String>> {
        match self.tree.get(KEY_PIN_HASH.as_bytes())? {
            Some(record) => Ok(Some(record.value.clone())),
            None => Ok(None),
        }
    }

    /// Whether a wallet is present (a private key is stored).
    pub fn wallet_exists(&self) -> Result<bool> {
        Ok(self.tree.get(KEY_PRIVATE_KEY.as_bytes())?.is_some())
    }

    /// Removes every credential. Used when the wallet is reset.
    pub fn clear(&self) -> Result<()> {
        for key in [KEY_PRIVATE_KEY, KEY_MNEMONIC, KEY_PIN_HASH] {
            self.tree.delete(key.as_bytes())?;
        }
        Ok(())
    }
}
