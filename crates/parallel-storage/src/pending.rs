//! Pending transaction store.
//!
//! Right after broadcast the wallet synthesizes a pending record so history
//! shows the transfer before any indexer has seen it. Records are keyed by
//! lowercase transaction hash; reconciliation removes them once a fetched
//! row carries the same hash.

use parallel_types::{Result, TxHash, TxRecord};

use crate::encrypted_tree::EncryptedTree;
use crate::engine::StorageEngine;

/// Encrypted store of transactions awaiting confirmation.
pub struct PendingTxStore<'a> {
    tree: EncryptedTree<'a, TxRecord>,
}

impl<'a> PendingTxStore<'a> {
    pub(crate) fn new(engine: &'a StorageEngine) -> Result<Self> {
        let sled_tree = engine.open_tree("pending_txs")?;
        Ok(Self {
            tree: EncryptedTree::new(sled_tree, engine.keys()),
        })
    }

    /// Inserts or replaces the record stored under its hash.
    pub fn upsert(&self, record: &TxRecord) -> Result<()> {
        self.tree.insert(key_for(&record.hash).as_bytes(), record)
    }

    /// Returns every pending record, in unspecified order.
    pub fn all(&self) -> Result<Vec<TxRecord>> {
        Ok(self
            .tree
            .iter()?
            .into_iter()
            .map(|(_, record)| record)
            .collect())
    }

    /// Removes the record for `hash`. Returns whether it existed.
    pub fn remove(&self, hash: &TxHash) -> Result<bool> {
        self.tree.delete(key_for(hash).as_bytes())
    }

    /// Drops every pending record.
    pub fn clear(&self) -> Result<()> {
        self.tree.clear()
    }
}

fn key_for(hash: &TxHash) -> String {
    // Display renders 0x + lowercase hex, giving a canonical key.
    hash.to_string()
}
