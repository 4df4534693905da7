//! Chunked `eth_getLogs` scan for token transfer history.
//!
//! The indexer is the preferred history source; this scanner is the RPC
//! fallback. It walks ERC-20 `Transfer` logs over a bounded lookback,
//! split into chunks the public nodes will accept. The first-ranked
//! endpoint gets the full window; every lower-ranked endpoint gets a
//! narrow one, since endpoints that reject large ranges tend to be the
//! rate-limited public ones. Plain value transfers leave no logs, so
//! native-coin rows can only come from the indexer.

use std::collections::{HashMap, HashSet};

use serde_json::json;
use tracing::{debug, warn};

use parallel_protocol::erc20;
use parallel_types::{
    Address, ParallelError, Result, TokenKind, TxDirection, TxHash, TxRecord, TxStatus, Wei,
};

use crate::rpc::{LogEntry, RpcClient};

// ---------------------------------------------------------------------------
// Scan windows
// ---------------------------------------------------------------------------

/// Scan geometry: how far back to look and how wide each chunk is.
#[derive(Clone, Copy, Debug)]
pub struct ScanWindow {
    pub lookback_blocks: u64,
    pub chunk_blocks: u64,
}

/// Window used on the first-ranked endpoint, roughly a year of blocks.
pub const PRIMARY_WINDOW: ScanWindow = ScanWindow {
    lookback_blocks: 1_000_000,
    chunk_blocks: 50_000,
};

/// Narrow window used once the scan drops to a lower-ranked endpoint.
pub const FALLBACK_WINDOW: ScanWindow = ScanWindow {
    lookback_blocks: 50_000,
    chunk_blocks: 2_000,
};

// ---------------------------------------------------------------------------
// TransferScanner
// ---------------------------------------------------------------------------

/// Scans token transfer logs involving one wallet address.
pub struct TransferScanner<'a> {
    rpc: &'a RpcClient,
    lut_contract: Address,
}

impl<'a> TransferScanner<'a> {
    pub fn new(rpc: &'a RpcClient, lut_contract: Address) -> Self {
        Self { rpc, lut_contract }
    }

    /// Returns confirmed token transfer records where `user` is sender or
    /// receiver, unordered; callers sort during reconciliation.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::HistoryFetchError`] once every endpoint
    /// has failed.
    pub async fn scan(&self, user: &Address) -> Result<Vec<TxRecord>> {
        let mut last_error = None;
        for (rank, endpoint) in self.rpc.endpoints().iter().enumerate() {
            let window = if rank == 0 {
                PRIMARY_WINDOW
            } else {
                FALLBACK_WINDOW
            };
            match self.scan_endpoint(endpoint, user, window).await {
                Ok(records) => return Ok(records),
                Err(e) => {
                    warn!(endpoint = %endpoint, error = %e, "transfer scan failed on endpoint");
                    last_error = Some(e);
                }
            }
        }
        Err(ParallelError::HistoryFetchError {
            reason: match last_error {
                Some(e) => format!("transfer scan failed on every endpoint: {e}"),
                None => "no endpoints configured".into(),
            },
        })
    }

    async fn scan_endpoint(
        &self,
        endpoint: &str,
        user: &Address,
        window: ScanWindow,
    ) -> Result<Vec<TxRecord>> {
        let head = self.rpc.block_number_on(endpoint).await?;
        let from = head.saturating_sub(window.lookback_blocks);
        let chunks = chunk_ranges(from, head, window.chunk_blocks);
        debug!(endpoint = %endpoint, from, head, chunks = chunks.len(), "scanning transfer logs");

        let user_topic = erc20::address_topic(user);

        // A self-transfer matches both filters; (hash, logIndex) dedups it.
        let mut seen: HashSet<(TxHash, u64)> = HashSet::new();
        let mut logs: Vec<LogEntry> = Vec::new();
        for (start, end) in chunks {
            let sent = self.transfer_logs(endpoint, start, end, &user_topic, true);
            let received = self.transfer_logs(endpoint, start, end, &user_topic, false);
            let (sent, received) = tokio::join!(sent, received);
            for log in sent?.into_iter().chain(received?) {
                if seen.insert((log.transaction_hash, log.log_index)) {
                    logs.push(log);
                }
            }
        }

        // One timestamp lookup per distinct block.
        let mut timestamps: HashMap<u64, u64> = HashMap::new();
        for log in &logs {
            if !timestamps.contains_key(&log.block_number) {
                let seconds = self.rpc.block_timestamp_on(endpoint, log.block_number).await?;
                timestamps.insert(log.block_number, seconds);
            }
        }

        logs.iter()
            .map(|log| log_to_record(log, user, &timestamps))
            .collect()
    }

    async fn transfer_logs(
        &self,
        endpoint: &str,
        from_block: u64,
        to_block: u64,
        user_topic: &str,
        sent: bool,
    ) -> Result<Vec<LogEntry>> {
        let topics = if sent {
            json!([erc20::TRANSFER_EVENT_TOPIC, user_topic])
        } else {
            json!([erc20::TRANSFER_EVENT_TOPIC, null, user_topic])
        };
        let filter = json!({
            "address": self.lut_contract.to_string(),
            "fromBlock": format!("0x{from_block:x}"),
            "toBlock": format!("0x{to_block:x}"),
            "topics": topics,
        });
        self.rpc.logs_on(endpoint, filter).await
    }
}

// ---------------------------------------------------------------------------
// Pure helpers
// ---------------------------------------------------------------------------

/// Splits `from..=to` into inclusive chunk ranges of at most `chunk`
/// blocks each. Empty when the span or `chunk` is zero.
fn chunk_ranges(from: u64, to: u64, chunk: u64) -> Vec<(u64, u64)> {
    let mut ranges = Vec::new();
    if chunk == 0 {
        return ranges;
    }
    let mut start = from;
    while start < to {
        let end = start.saturating_add(chunk - 1).min(to);
        ranges.push((start, end));
        start = start.saturating_add(chunk);
    }
    ranges
}

fn log_to_record(
    log: &LogEntry,
    user: &Address,
    timestamps: &HashMap<u64, u64>,
) -> Result<TxRecord> {
    if log.topics.len() < 3 {
        return Err(ParallelError::RpcError {
            reason: format!(
                "transfer log {} carries {} topics, expected 3",
                log.transaction_hash,
                log.topics.len()
            ),
        });
    }
    let from = topic_address(&log.topics[1])?;
    let to = topic_address(&log.topics[2])?;
    let raw_amount = Wei::from_hex_quantity(&log.data)?;
    let seconds = timestamps
        .get(&log.block_number)
        .copied()
        .ok_or_else(|| ParallelError::RpcError {
            reason: format!("no timestamp cached for block {}", log.block_number),
        })?;

    let incoming = to == *user;
    Ok(TxRecord {
        hash: log.transaction_hash,
        token: TokenKind::Lut,
        direction: if incoming {
            TxDirection::Incoming
        } else {
            TxDirection::Outgoing
        },
        title: if incoming {
            "Received LUT".to_string()
        } else {
            "Sent LUT".to_string()
        },
        from,
        to,
        amount: raw_amount.format_units(TokenKind::Lut.decimals()),
        raw_amount,
        timestamp_ms: seconds as i64 * 1000,
        status: TxStatus::Confirmed,
        fee: None,
        usd_value: None,
    })
}

/// Extracts the address from a 32-byte-word log topic.
fn topic_address(topic: &str) -> Result<Address> {
    let digits = topic.strip_prefix("0x").unwrap_or(topic);
    if digits.len() != 64 {
        return Err(ParallelError::RpcError {
            reason: format!("log topic is not a 32-byte word: {topic}"),
        });
    }
    format!("0x{}", &digits[24..])
        .parse()
        .map_err(|_| ParallelError::RpcError {
            reason: format!("log topic holds no valid address: {topic}"),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
