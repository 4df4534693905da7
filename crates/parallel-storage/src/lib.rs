//! Encrypted storage for the Parallel wallet.
//!
//! A sled database holds everything the wallet persists: signing
//! credentials, locally-synthesized pending transactions, and small
//! settings flags. Every value is sealed with XChaCha20-Poly1305 and
//! authenticated with HMAC-SHA256 before it touches disk; the master key
//! is derived outside this crate and handed to
//! [`StorageEngine::open`](engine::StorageEngine::open).

pub mod credentials;
pub mod encrypted_tree;
pub mod engine;
pub mod pending;
pub mod settings;

pub use credentials::CredentialStore;
pub use engine::StorageEngine;
pub use pending::PendingTxStore;
pub use settings::SettingsStore;
