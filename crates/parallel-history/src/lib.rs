//! Transaction history for the Parallel wallet.
//!
//! History is assembled from two sides: confirmed and failed records
//! fetched from a Blockscout indexer (with a direct transfer-log scan as
//! fallback), and pending records the wallet synthesized at broadcast
//! time. The reconciler merges them by transaction hash so an in-flight
//! send is visible immediately and hands over to the indexed row once
//! one exists. Grouping and filtering are pure display helpers.

pub mod filter;
pub mod grouping;
pub mod indexer;
pub mod reconcile;

pub use filter::HistoryFilter;
pub use grouping::group_by_day;
pub use indexer::IndexerClient;
pub use reconcile::HistoryReconciler;
