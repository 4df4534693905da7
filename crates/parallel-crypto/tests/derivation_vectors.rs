//! End-to-end derivation vectors: mnemonic to seed to account key.

use parallel_crypto::address::to_eip55;
use parallel_crypto::hd_derive::{derive_path, derive_wallet_key, WALLET_DERIVATION_PATH};
use parallel_crypto::mnemonic::{mnemonic_to_seed, Mnemonic};
use parallel_types::ParallelError;

type TestResult = std::result::Result<(), ParallelError>;

// Standard development mnemonic shipped by local Ethereum test nodes.
const DEV_MNEMONIC: &str = "test test test test test test test test test test test junk";

// =============================================================================
// Account zero vectors
// =============================================================================

#[test]
fn dev_mnemonic_derives_known_account() -> TestResult {
    let mnemonic = Mnemonic::from_phrase(DEV_MNEMONIC)?;
    let seed = mnemonic_to_seed(&mnemonic, "")?;
    let key = derive_wallet_key(&seed)?;
    assert_eq!(
        key.to_hex(),
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
    );
    assert_eq!(
        to_eip55(&key.address()?),
        "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
    );
    Ok(())
}

#[test]
fn abandon_mnemonic_derives_known_account() -> TestResult {
    let mnemonic = Mnemonic::from_phrase(
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about",
    )?;
    let seed = mnemonic_to_seed(&mnemonic, "")?;
    let key = derive_wallet_key(&seed)?;
    assert_eq!(
        to_eip55(&key.address()?),
        "0x9858EfFD232B4033E47d90003D41EC34EcaEda94"
    );
    Ok(())
}

// =============================================================================
// Path handling
// =============================================================================

#[test]
fn account_path_matches_explicit_walk() -> TestResult {
    let mnemonic = Mnemonic::from_phrase(DEV_MNEMONIC)?;
    let seed = mnemonic_to_seed(&mnemonic, "")?;
    let fixed = derive_wallet_key(&seed)?;
    let walked = derive_path(seed.as_bytes(), "m/44h/60h/0h/0/0")?.into_private_key()?;
    assert_eq!(fixed.as_bytes(), walked.as_bytes());
    assert_eq!(WALLET_DERIVATION_PATH, "m/44'/60'/0'/0/0");
    Ok(())
}

#[test]
fn next_account_index_derives_known_sibling() -> TestResult {
    let mnemonic = Mnemonic::from_phrase(DEV_MNEMONIC)?;
    let seed = mnemonic_to_seed(&mnemonic, "")?;
    let second = derive_path(seed.as_bytes(), "m/44'/60'/0'/0/1")?.into_private_key()?;
    assert_eq!(
        to_eip55(&second.address()?),
        "0x70997970C51812dc3A010C7d01b50e0d17dc79C8"
    );
    Ok(())
}
