//! Wallet lifecycle management for Parallel.
//!
//! Handles the full account lifecycle:
//!
//! - **Create** a fresh 24-word wallet from OS entropy
//! - **Import** from an existing 12- or 24-word BIP39 phrase
//! - **Persist** credentials in the encrypted store
//! - **PIN gate** (set, verify, keccak-hashed at rest)
//! - **Backup** the recovery phrase (show once, require confirmation)
//! - **Session** lock/unlock with the auth token lifetime bound to it

pub mod backup;
pub mod identity;
pub mod manager;
pub mod pin;
pub mod session;

pub use backup::{export_backup, BackupFlow, BackupState};
pub use identity::{
    derive_address, generate_identity, identity_from_mnemonic, import_mnemonic, WalletIdentity,
};
pub use manager::WalletManager;
pub use pin::{Pin, PIN_LEN};
pub use session::{SessionState, WalletSession};
