//! Integration tests for history reconciliation over a real store.
//!
//! The indexer and RPC endpoints point at an unroutable local port, so
//! every fetch fails fast and the reconciler has to degrade. Each test
//! opens its own sled database under a unique temporary directory.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use parallel_chain::{RpcClient, TransferScanner};
use parallel_history::{HistoryFilter, HistoryReconciler, IndexerClient};
use parallel_storage::StorageEngine;
use parallel_types::{
    Address, TokenKind, TxDirection, TxHash, TxRecord, TxStatus, Wei,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Nothing listens on port 1, so requests are refused immediately.
const DEAD_ENDPOINT: &str = "http://127.0.0.1:1";

static COUNTER: AtomicU32 = AtomicU32::new(0);

fn temp_dir() -> PathBuf {
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!(
        "parallel-history-test-{}-{}-{}",
        std::process::id(),
        id,
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0),
    ));
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn test_key() -> [u8; 32] {
    let mut k = [0u8; 32];
    for (i, byte) in k.iter_mut().enumerate() {
        *byte = (i as u8).wrapping_mul(31).wrapping_add(0x11);
    }
    k
}

fn lut_contract() -> Address {
    "0x4dd73b9a98f401fb3c53df33a9e05bea1419eb5e".parse().unwrap()
}

fn dead_indexer() -> IndexerClient {
    IndexerClient::new(DEAD_ENDPOINT, lut_contract(), 1).unwrap()
}

fn pending_record(seed: u8, timestamp_ms: i64) -> TxRecord {
    TxRecord {
        hash: TxHash::new([seed; 32]),
        token: TokenKind::Lut,
        direction: TxDirection::Outgoing,
        title: "Sent LUT".to_string(),
        from: Address::new([0xAA; 20]),
        to: Address::new([seed; 20]),
        amount: "25.00".to_string(),
        raw_amount: Wei::new(25_000_000_000_000_000_000),
        timestamp_ms,
        status: TxStatus::Pending,
        fee: None,
        usd_value: None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unreachable_indexer_degrades_to_pending_records() {
    let dir = temp_dir();
    let engine = StorageEngine::open(&dir.join("store.db"), &test_key()).unwrap();
    let indexer = dead_indexer();
    let reconciler = HistoryReconciler::new(&indexer, engine.pending_txs().unwrap(), None);

    reconciler
        .add_pending_record(&pending_record(1, 1_000))
        .unwrap();
    reconciler
        .add_pending_record(&pending_record(2, 2_000))
        .unwrap();

    let history = reconciler
        .load_history(&Address::new([0xAA; 20]))
        .await
        .unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].timestamp_ms, 2_000);
    assert_eq!(history[1].timestamp_ms, 1_000);
    assert!(history.iter().all(|r| r.status == TxStatus::Pending));
}

#[tokio::test]
async fn dead_log_scan_fallback_still_degrades() {
    let dir = temp_dir();
    let engine = StorageEngine::open(&dir.join("store.db"), &test_key()).unwrap();
    let indexer = dead_indexer();
    let rpc = RpcClient::new(vec![DEAD_ENDPOINT.to_string()], 1).unwrap();
    let scanner = TransferScanner::new(&rpc, lut_contract());
    let reconciler =
        HistoryReconciler::new(&indexer, engine.pending_txs().unwrap(), Some(scanner));

    reconciler
        .add_pending_record(&pending_record(7, 7_000))
        .unwrap();

    let history = reconciler
        .load_history(&Address::new([0xAA; 20]))
        .await
        .unwrap();

    assert_eq!(history.len(), 1);
    assert_eq!(history[0].hash, TxHash::new([7; 32]));
}

#[tokio::test]
async fn re_adding_a_pending_hash_replaces_the_record() {
    let dir = temp_dir();
    let engine = StorageEngine::open(&dir.join("store.db"), &test_key()).unwrap();
    let indexer = dead_indexer();
    let reconciler = HistoryReconciler::new(&indexer, engine.pending_txs().unwrap(), None);

    reconciler
        .add_pending_record(&pending_record(3, 1_000))
        .unwrap();
    let mut replacement = pending_record(3, 4_000);
    replacement.amount = "50.00".to_string();
    reconciler.add_pending_record(&replacement).unwrap();

    let pending = reconciler.pending_records().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].amount, "50.00");
    assert_eq!(pending[0].timestamp_ms, 4_000);
}

#[tokio::test]
async fn pending_records_survive_reopen() {
    let dir = temp_dir();
    let path = dir.join("store.db");

    {
        let engine = StorageEngine::open(&path, &test_key()).unwrap();
        let indexer = dead_indexer();
        let reconciler = HistoryReconciler::new(&indexer, engine.pending_txs().unwrap(), None);
        reconciler
            .add_pending_record(&pending_record(9, 9_000))
            .unwrap();
        engine.flush().unwrap();
    }

    let engine = StorageEngine::open(&path, &test_key()).unwrap();
    let indexer = dead_indexer();
    let reconciler = HistoryReconciler::new(&indexer, engine.pending_txs().unwrap(), None);
    let history = reconciler
        .load_history(&Address::new([0xAA; 20]))
        .await
        .unwrap();

    assert_eq!(history.len(), 1);
    assert_eq!(history[0].title, "Sent LUT");
}

#[tokio::test]
async fn filters_slice_the_degraded_view() {
    let dir = temp_dir();
    let engine = StorageEngine::open(&dir.join("store.db"), &test_key()).unwrap();
    let indexer = dead_indexer();
    let reconciler = HistoryReconciler::new(&indexer, engine.pending_txs().unwrap(), None);

    reconciler
        .add_pending_record(&pending_record(1, 1_000))
        .unwrap();
    let mut received = pending_record(2, 2_000);
    received.direction = TxDirection::Incoming;
    received.title = "Received LUT".to_string();
    reconciler.add_pending_record(&received).unwrap();

    let history = reconciler
        .load_history(&Address::new([0xAA; 20]))
        .await
        .unwrap();

    let sent: Vec<_> = history
        .iter()
        .filter(|r| HistoryFilter::Sent.matches(r))
        .collect();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "Sent LUT");
}
