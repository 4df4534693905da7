//! Deterministic wire encodings for the Parallel wallet.
//!
//! Everything that must hash or serialize to the exact same bytes on every
//! machine lives here:
//!
//! - [`rlp`]: recursive length prefix encoding for transactions.
//! - [`transaction`]: legacy transactions with EIP-155 replay protection.
//! - [`eip712`]: typed-data digests for governance votes and proposals.
//! - [`erc20`]: calldata and log-topic encoding for the token contract.
//!
//! Nothing in this crate performs I/O; the chain and governance crates feed
//! these bytes to their transports.

pub mod eip712;
pub mod erc20;
pub mod rlp;
pub mod transaction;

pub use eip712::{ProposalMessage, VoteMessage};
pub use transaction::LegacyTransaction;
