//! Encrypted key-value settings store.
//!
//! Small flags the wallet needs across restarts: whether onboarding
//! completed, which address is active, and whether balances come from the
//! mock source.

use parallel_types::Result;
use serde::{Deserialize, Serialize};

use crate::encrypted_tree::EncryptedTree;
use crate::engine::StorageEngine;

const KEY_WALLET_CREATED: &str = "wallet_created";
const KEY_ACTIVE_ADDRESS: &str = "active_address";
const KEY_USE_MOCK_BALANCES: &str = "use_mock_balances";

/// Wrapper for a stored setting value.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SettingValue {
    /// The setting value as a string.
    pub value: String,
}

/// Encrypted key-value settings store.
pub struct SettingsStore<'a> {
    tree: EncryptedTree<'a, SettingValue>,
}

impl<'a> SettingsStore<'a> {
    pub(crate) fn new(engine: &'a StorageEngine) -> Result<Self> {
        let sled_tree = engine.open_tree("settings")?;
        Ok(Self {
            tree: EncryptedTree::new(sled_tree, engine.keys()),
        })
    }

    /// Sets a string setting.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.tree.insert(
            key.as_bytes(),
            &SettingValue {
                value: value.to_string(),
            },
        )
    }

    /// Gets a string setting.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        match self.tree.get(key.as_bytes())? {
            Some(setting) => Ok(Some(setting.value)),
            None => Ok(None),
        }
    }

    /// Removes a setting.
    pub fn remove(&self, key: &str) -> Result<bool> {
        self.tree.delete(key.as_bytes())
    }

    /// Marks onboarding as finished (or not).
    pub fn set_wallet_created(&self, created: bool) -> Result<()> {
        self.set(KEY_WALLET_CREATED, bool_str(created))
    }

    /// Whether onboarding ever finished. Defaults to `false`.
    pub fn wallet_created(&self) -> Result<bool> {
        Ok(self.get(KEY_WALLET_CREATED)?.as_deref() == Some("true"))
    }

    /// Stores the checksummed address of the active account.
    pub fn set_active_address(&self, address: &str) -> Result<()> {
        self.set(KEY_ACTIVE_ADDRESS, address)
    }

    /// The checksummed address of the active account, if any.
    pub fn active_address(&self) -> Result<Option<String>> {
        self.get(KEY_ACTIVE_ADDRESS)
    }

    /// Switches balance reads between the chain and the mock source.
    pub fn set_use_mock_balances(&self, enabled: bool) -> Result<()> {
        self.set(KEY_USE_MOCK_BALANCES, bool_str(enabled))
    }

    /// Whether balances come from the mock source. Defaults to `false`.
    pub fn use_mock_balances(&self) -> Result<bool> {
        Ok(self.get(KEY_USE_MOCK_BALANCES)?.as_deref() == Some("true"))
    }
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
