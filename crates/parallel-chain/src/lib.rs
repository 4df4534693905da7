//! Chain gateway for the Parallel wallet.
//!
//! Everything that talks JSON-RPC lives here:
//!
//! - [`rpc`]: the transport, with ranked endpoint failover.
//! - [`balances`]: native and token balance reads, plus the mock source.
//! - [`fees`]: fee estimation and the stale-quote sequencer.
//! - [`broadcast`]: transaction construction, signing, and submission.
//! - [`logs`]: the chunked transfer-log scanner used as history fallback.
//!
//! The crate holds no wallet state; callers pass addresses and keys in
//! per operation.

pub mod balances;
pub mod broadcast;
pub mod fees;
pub mod logs;
pub mod rpc;

pub use balances::{BalanceReader, MOCK_LUT_BALANCE, MOCK_RBTC_BALANCE};
pub use broadcast::{Broadcaster, SendRequest};
pub use fees::{EstimateSequencer, FeeEstimator, FeeRequest};
pub use logs::TransferScanner;
pub use rpc::{LogEntry, RpcClient};
