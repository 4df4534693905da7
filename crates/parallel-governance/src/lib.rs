//! Governance client for the Parallel Society backend.
//!
//! Sign-in is a wallet signature, not a password: the backend issues a
//! nonce, the user signs a fixed statement over it (EIP-191), and the
//! backend answers with a bearer token for mutating calls. Votes and
//! proposals are EIP-712 typed messages signed with the wallet key; the
//! backend verifies every signature and owns all tallying, so this crate
//! never computes voting weight or results locally.

pub mod client;
pub mod draft;

pub use client::{sign_in_message, GovernanceClient};
pub use draft::{
    meets_proposal_threshold, ProposalDraft, DEFAULT_VOTING_WINDOW_SECS, MIN_PROPOSAL_LUT,
};
