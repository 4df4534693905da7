//! Pure mnemonic-to-identity derivation.
//!
//! Everything here is deterministic: the same phrase always yields the
//! same private key and address. Persistence is the manager's job; no
//! function in this module touches storage.

use parallel_crypto::{
    derive_wallet_key, generate_mnemonic, mnemonic_to_seed, to_eip55, Mnemonic, PrivateKey,
};
use parallel_types::{Address, Result};

/// Key material for one wallet account.
///
/// Bundles the three values derived during create/import. Contains
/// secrets, so it implements neither `Clone` nor `Debug`; the mnemonic
/// and private key zeroize themselves on drop.
pub struct WalletIdentity {
    /// Account address, `keccak256(uncompressed_pubkey[1..])[12..]`.
    pub address: Address,
    /// secp256k1 private key at `m/44'/60'/0'/0/0`.
    pub private_key: PrivateKey,
    /// The BIP39 phrase the key was derived from.
    pub mnemonic: Mnemonic,
}

impl WalletIdentity {
    /// EIP-55 checksummed display form of the address.
    pub fn checksummed_address(&self) -> String {
        to_eip55(&self.address)
    }
}

/// Derives the full identity from a validated mnemonic.
///
/// BIP39 seed with an empty passphrase, then BIP32 secp256k1 derivation
/// at the fixed wallet path.
pub fn identity_from_mnemonic(mnemonic: Mnemonic) -> Result<WalletIdentity> {
    let seed = mnemonic_to_seed(&mnemonic, "")?;
    let private_key = derive_wallet_key(&seed)?;
    let address = private_key.address()?;
    Ok(WalletIdentity {
        address,
        private_key,
        mnemonic,
    })
}

/// Generates a fresh 24-word identity from OS entropy.
pub fn generate_identity() -> Result<WalletIdentity> {
    identity_from_mnemonic(generate_mnemonic()?)
}

/// Imports an identity from user-entered words.
///
/// # Errors
///
/// Returns [`parallel_types::ParallelError::InvalidMnemonic`] unless the
/// normalized input is a checksum-valid 12- or 24-word phrase.
pub fn import_mnemonic(words: &str) -> Result<WalletIdentity> {
    identity_from_mnemonic(Mnemonic::from_phrase(words)?)
}

/// Derives just the address for a phrase. Pure.
pub fn derive_address(mnemonic: &Mnemonic) -> Result<Address> {
    let seed = mnemonic_to_seed(mnemonic, "")?;
    derive_wallet_key(&seed)?.address()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
