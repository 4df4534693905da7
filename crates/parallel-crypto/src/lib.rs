//! Cryptographic primitives for the Parallel wallet core.
//!
//! This crate owns every operation that touches raw key material:
//!
//! - BIP-39 mnemonic generation, validation, and seed derivation
//!   ([`mnemonic`]).
//! - BIP-32 hierarchical derivation on secp256k1 ([`hd_derive`]).
//! - Keccak-256 hashing ([`hash`]) and Ethereum address formatting
//!   ([`address`]).
//! - Recoverable ECDSA signing and EIP-191 personal messages
//!   ([`signing`]).
//! - Argon2id password hardening ([`kdf`]), HKDF subkey expansion
//!   ([`hkdf`]), XChaCha20-Poly1305 sealing ([`aead`]), and HMAC-SHA256
//!   tamper tags ([`mac`]) for the credential store.
//!
//! Secret-bearing types (`Mnemonic`, `Seed`, `ExtendedKey`, `PrivateKey`,
//! `DerivedKey`) zeroize their contents on drop and deliberately do not
//! implement `Clone` or `Debug`. Callers that need a copy of the bytes must
//! take one explicitly and own its lifetime.

pub mod aead;
pub mod address;
pub mod hash;
pub mod hd_derive;
pub mod hkdf;
pub mod kdf;
pub mod mac;
pub mod mnemonic;
pub mod signing;

pub use address::{pubkey_to_address, to_eip55};
pub use hash::keccak256;
pub use hd_derive::{derive_path, derive_wallet_key, ExtendedKey, WALLET_DERIVATION_PATH};
pub use mnemonic::{generate_mnemonic, mnemonic_to_seed, validate_mnemonic, Mnemonic, Seed};
pub use signing::{personal_sign, sign_digest, PrivateKey, RecoverableSignature};
