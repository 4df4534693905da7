//! Pending-record reconciliation.
//!
//! Right after broadcast the wallet only knows its own side of the
//! story: a locally-synthesized pending record. The reconciler merges
//! that local knowledge with what the indexer reports, so the user
//! always sees an in-flight send, and sees it exactly once after the
//! indexer catches up. When the indexer is unreachable the merged view
//! degrades, first to a direct transfer-log scan, then to the pending
//! records alone; it never fails outright.

use std::collections::HashSet;

use tracing::{debug, warn};

use parallel_chain::TransferScanner;
use parallel_storage::PendingTxStore;
use parallel_types::{Address, Result, TxHash, TxRecord};

use crate::indexer::IndexerClient;

// ---------------------------------------------------------------------------
// HistoryReconciler
// ---------------------------------------------------------------------------

/// Merges indexed history with locally-pending sends.
pub struct HistoryReconciler<'a> {
    indexer: &'a IndexerClient,
    pending: PendingTxStore<'a>,
    fallback: Option<TransferScanner<'a>>,
}

impl<'a> HistoryReconciler<'a> {
    /// Builds a reconciler over an indexer, a pending store, and an
    /// optional log-scan fallback for when the indexer is down.
    pub fn new(
        indexer: &'a IndexerClient,
        pending: PendingTxStore<'a>,
        fallback: Option<TransferScanner<'a>>,
    ) -> Self {
        Self {
            indexer,
            pending,
            fallback,
        }
    }

    /// Records a freshly-broadcast transaction.
    ///
    /// Re-adding a hash replaces the stored record, never duplicates it.
    ///
    /// # Errors
    ///
    /// Returns [`parallel_types::ParallelError::StorageUnavailable`] when
    /// the store cannot be written.
    pub fn add_pending_record(&self, record: &TxRecord) -> Result<()> {
        self.pending.upsert(record)
    }

    /// The locally-pending records, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`parallel_types::ParallelError::StorageUnavailable`] when
    /// the store cannot be read.
    pub fn pending_records(&self) -> Result<Vec<TxRecord>> {
        let mut records = self.pending.all()?;
        records.sort_by(|a, b| b.timestamp_ms.cmp(&a.timestamp_ms));
        Ok(records)
    }

    /// The full history view: indexed records merged with pending ones,
    /// newest first.
    ///
    /// Pending records whose hash appears in the fetched set are
    /// superseded (the fetched status wins) and pruned from the store.
    /// Fetch failures degrade the view instead of failing it.
    ///
    /// # Errors
    ///
    /// Returns [`parallel_types::ParallelError::StorageUnavailable`] when
    /// the pending store cannot be read; fetch errors never surface here.
    pub async fn load_history(&self, address: &Address) -> Result<Vec<TxRecord>> {
        let fetched = self.fetch_confirmed(address).await;
        let pending = self.pending.all()?;

        let fetched_hashes: HashSet<TxHash> = fetched.iter().map(|record| record.hash).collect();
        for record in pending.iter().filter(|r| fetched_hashes.contains(&r.hash)) {
            // The indexer has caught up with this send.
            if let Err(e) = self.pending.remove(&record.hash) {
                warn!(hash = %record.hash, error = %e, "failed to prune superseded pending record");
            }
        }

        let merged = merge_records(fetched, pending);
        debug!(records = merged.len(), "history reconciled");
        Ok(merged)
    }

    async fn fetch_confirmed(&self, address: &Address) -> Vec<TxRecord> {
        let indexer_err = match self.indexer.all_transactions(address).await {
            Ok(records) => return records,
            Err(e) => e,
        };
        if let Some(scanner) = &self.fallback {
            warn!(error = %indexer_err, "indexer fetch failed, scanning transfer logs instead");
            match scanner.scan(address).await {
                Ok(records) => return records,
                Err(e) => {
                    warn!(error = %e, "transfer log scan failed, showing pending records only");
                }
            }
        } else {
            warn!(error = %indexer_err, "indexer fetch failed, showing pending records only");
        }
        Vec::new()
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Unions fetched and pending records, newest first.
///
/// A pending record survives only while no fetched record carries its
/// hash. Hash equality is byte equality, so mixed-case hex encodings
/// from different sources still collide.
fn merge_records(fetched: Vec<TxRecord>, pending: Vec<TxRecord>) -> Vec<TxRecord> {
    let fetched_hashes: HashSet<TxHash> = fetched.iter().map(|record| record.hash).collect();
    let mut merged = fetched;
    merged.extend(
        pending
            .into_iter()
            .filter(|record| !fetched_hashes.contains(&record.hash)),
    );
    merged.sort_by(|a, b| b.timestamp_ms.cmp(&a.timestamp_ms));
    merged
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
