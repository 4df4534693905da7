//! Wallet lifecycle over the encrypted credential store.
//!
//! A [`WalletManager`] borrows the storage engine and performs the
//! persistent side of every lifecycle operation: create, import, PIN
//! gate, mnemonic reveal, and teardown. Key material passes through
//! transiently; nothing here caches a private key.

use parallel_crypto::{to_eip55, Mnemonic, PrivateKey};
use parallel_storage::StorageEngine;
use parallel_types::{Address, ParallelError, Result};
use tracing::{info, warn};

use crate::identity::{generate_identity, import_mnemonic, WalletIdentity};
use crate::pin::Pin;

/// Persistent wallet operations bound to one storage engine.
pub struct WalletManager<'a> {
    engine: &'a StorageEngine,
}

impl<'a> WalletManager<'a> {
    /// Binds a manager to an open storage engine.
    pub fn new(engine: &'a StorageEngine) -> Self {
        Self { engine }
    }

    // -- Lifecycle ----------------------------------------------------------

    /// Creates a fresh 24-word wallet and persists its credentials.
    ///
    /// # Process
    ///
    /// 1. Generate a 24-word mnemonic from OS entropy.
    /// 2. Derive the private key and address at `m/44'/60'/0'/0/0`.
    /// 3. Store the private key and mnemonic encrypted.
    /// 4. Record the checksummed address and set the created flag.
    ///
    /// Returns the identity so the caller can run the backup ceremony;
    /// this is the only time the fresh mnemonic leaves the store.
    pub fn create_wallet(&self) -> Result<WalletIdentity> {
        let identity = generate_identity()?;
        self.persist_identity(&identity)?;
        info!(address = %identity.checksummed_address(), "wallet created");
        Ok(identity)
    }

    /// Imports a wallet from user-entered words and persists it.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::InvalidMnemonic`] unless the input
    /// normalizes to a checksum-valid 12- or 24-word phrase.
    pub fn import_wallet(&self, words: &str) -> Result<WalletIdentity> {
        let identity = import_mnemonic(words)?;
        self.persist_identity(&identity)?;
        info!(address = %identity.checksummed_address(), "wallet imported");
        Ok(identity)
    }

    fn persist_identity(&self, identity: &WalletIdentity) -> Result<()> {
        let credentials = self.engine.credentials()?;
        if credentials.wallet_exists()? {
            warn!("replacing existing wallet credentials");
        }
        credentials.store_private_key(&identity.private_key)?;
        credentials.store_mnemonic(&identity.mnemonic)?;

        let settings = self.engine.settings()?;
        settings.set_active_address(&identity.checksummed_address())?;
        settings.set_wallet_created(true)?;

        self.engine.flush()
    }

    /// Deletes every credential and pending record and resets the
    /// created flag. The PIN hash goes with the rest.
    pub fn clear_wallet(&self) -> Result<()> {
        self.engine.credentials()?.clear()?;
        self.engine.pending_txs()?.clear()?;

        let settings = self.engine.settings()?;
        settings.set_wallet_created(false)?;
        settings.remove("active_address")?;

        self.engine.flush()?;
        info!("wallet cleared");
        Ok(())
    }

    // -- Queries ------------------------------------------------------------

    /// Whether a private key is stored.
    pub fn wallet_exists(&self) -> Result<bool> {
        self.engine.credentials()?.wallet_exists()
    }

    /// The active account address, if onboarding ever completed.
    pub fn active_address(&self) -> Result<Option<Address>> {
        match self.engine.settings()?.active_address()? {
            Some(text) => Ok(Some(text.parse()?)),
            None => Ok(None),
        }
    }

    /// EIP-55 display form of the active address.
    pub fn active_address_display(&self) -> Result<Option<String>> {
        Ok(self.active_address()?.map(|addr| to_eip55(&addr)))
    }

    /// Fetches the stored private key for one signing operation.
    ///
    /// Callers must not cache the result; fetch per signature and let
    /// the key zeroize on drop.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::SigningError`] when no wallet is stored.
    pub fn private_key(&self) -> Result<PrivateKey> {
        self.engine
            .credentials()?
            .private_key()?
            .ok_or_else(|| ParallelError::SigningError {
                reason: "no private key stored; create or import a wallet first".into(),
            })
    }

    // -- PIN gate -----------------------------------------------------------

    /// Stores the digest of a new PIN, replacing any previous one.
    pub fn set_pin(&self, pin: &Pin) -> Result<()> {
        self.engine.credentials()?.store_pin_hash(&pin.digest_hex())?;
        self.engine.flush()
    }

    /// Whether a PIN has been configured.
    pub fn has_pin(&self) -> Result<bool> {
        Ok(self.engine.credentials()?.pin_hash()?.is_some())
    }

    /// Checks a PIN against the stored digest.
    ///
    /// An unconfigured PIN verifies as `false`, never as an error.
    pub fn verify_pin(&self, pin: &Pin) -> Result<bool> {
        match self.engine.credentials()?.pin_hash()? {
            Some(stored) => Ok(stored == pin.digest_hex()),
            None => Ok(false),
        }
    }

    /// Returns the stored mnemonic after PIN verification.
    ///
    /// # Errors
    ///
    /// - [`ParallelError::AuthError`] when the PIN does not match.
    /// - [`ParallelError::SigningError`] when no mnemonic is stored.
    pub fn reveal_mnemonic(&self, pin: &Pin) -> Result<Mnemonic> {
        if !self.verify_pin(pin)? {
            return Err(ParallelError::AuthError {
                reason: "PIN verification failed".into(),
            });
        }
        self.engine
            .credentials()?
            .mnemonic()?
            .ok_or_else(|| ParallelError::SigningError {
                reason: "no mnemonic stored".into(),
            })
    }
}
