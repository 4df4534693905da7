//! Application container for Parallel.
//!
//! One [`App`] owns every subsystem for a running wallet:
//!
//! - **Store** opened with an Argon2id-stretched passphrase key
//! - **Chain** gateway (balances, fee quotes, broadcast)
//! - **History** reconciler (indexer merged with local pending rows)
//! - **Governance** client, when a backend is configured
//! - **Session** lock state, pinned address, and sign-in token
//!
//! Frontends (the CLI here) construct one `App` and call its methods;
//! no subsystem is reachable except through it.

pub mod app;
pub mod store_key;

pub use app::App;
pub use store_key::{load_or_create_salt, stretch_passphrase, SALT_FILE};
