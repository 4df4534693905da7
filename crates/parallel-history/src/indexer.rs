//! Blockscout indexer client.
//!
//! The indexer answers etherscan-style `module=account` queries and is
//! the primary history source: `txlist` for native transfers, `tokentx`
//! for governance-token transfers scoped to the token contract. Every
//! row maps into a [`TxRecord`]; malformed rows and envelope-level
//! errors surface as [`ParallelError::HistoryFetchError`] so the
//! reconciler can degrade instead of showing a broken list.

use std::collections::HashSet;
use std::time::Duration;

use serde::Deserialize;

use parallel_types::config::ChainProfile;
use parallel_types::{
    Address, ParallelError, Result, TokenKind, TxDirection, TxHash, TxRecord, TxStatus, Wei,
};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Depth at which an indexed transaction counts as settled on Rootstock.
const CONFIRMATION_DEPTH: u64 = 12;

/// Most rows a single query may return.
const PAGE_LIMIT: u32 = 1000;

/// Envelope message for an address with no history.
const NO_TRANSACTIONS: &str = "No transactions found";

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

/// Etherscan-style response envelope.
///
/// `result` stays untyped because error envelopes carry a message string
/// where success envelopes carry a row array.
#[derive(Debug, Deserialize)]
struct IndexerEnvelope {
    status: String,
    message: String,
    #[serde(default)]
    result: serde_json::Value,
}

/// One indexed transaction row, `txlist` and `tokentx` alike.
///
/// All quantities arrive as decimal strings. `isError` and `input` are
/// absent from token rows, so they default to empty.
#[derive(Debug, Deserialize)]
struct IndexerRow {
    hash: String,
    from: String,
    to: String,
    value: String,
    #[serde(rename = "timeStamp")]
    time_stamp: String,
    #[serde(default)]
    confirmations: String,
    #[serde(rename = "isError", default)]
    is_error: String,
    #[serde(default)]
    input: String,
    #[serde(rename = "gasUsed", default)]
    gas_used: String,
    #[serde(rename = "gasPrice", default)]
    gas_price: String,
}

// ---------------------------------------------------------------------------
// IndexerClient
// ---------------------------------------------------------------------------

/// HTTP client for one Blockscout API base URL.
pub struct IndexerClient {
    http: reqwest::Client,
    base_url: String,
    lut_contract: Address,
}

impl IndexerClient {
    /// Builds a client for `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::ConfigError`] when the URL is empty or
    /// the HTTP client cannot be constructed.
    pub fn new(base_url: &str, lut_contract: Address, timeout_secs: u64) -> Result<Self> {
        let base_url = base_url.trim();
        if base_url.is_empty() {
            return Err(ParallelError::ConfigError {
                reason: "indexer client needs a base URL".into(),
            });
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ParallelError::ConfigError {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            http,
            base_url: base_url.to_string(),
            lut_contract,
        })
    }

    /// Builds a client from a chain profile's indexer URL and token
    /// contract.
    ///
    /// # Errors
    ///
    /// Same as [`IndexerClient::new`].
    pub fn from_profile(profile: &ChainProfile, timeout_secs: u64) -> Result<Self> {
        Self::new(&profile.indexer_url, profile.lut_contract, timeout_secs)
    }

    /// The configured API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -----------------------------------------------------------------------
    // Fetches
    // -----------------------------------------------------------------------

    /// Native-coin transfers involving `address`, newest first.
    ///
    /// Zero-value rows are dropped; they are contract calls with no coin
    /// movement to show.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::HistoryFetchError`] on transport failure,
    /// an indexer error envelope, or a malformed row.
    pub async fn native_transactions(&self, address: &Address) -> Result<Vec<TxRecord>> {
        let rows = self
            .fetch_rows("txlist", &[("address", address.to_string())])
            .await?;
        native_records(&rows, address)
    }

    /// Governance-token transfers involving `address`, newest first.
    ///
    /// Queries are scoped to the configured token contract, so every row
    /// returned is a token transfer.
    ///
    /// # Errors
    ///
    /// Same as [`IndexerClient::native_transactions`].
    pub async fn token_transactions(&self, address: &Address) -> Result<Vec<TxRecord>> {
        let rows = self
            .fetch_rows(
                "tokentx",
                &[
                    ("contractaddress", self.lut_contract.to_string()),
                    ("address", address.to_string()),
                ],
            )
            .await?;
        token_records(&rows, address)
    }

    /// Both transfer kinds, queried concurrently, deduplicated by hash
    /// and sorted newest first.
    ///
    /// # Errors
    ///
    /// Returns the first failing leg's [`ParallelError::HistoryFetchError`].
    pub async fn all_transactions(&self, address: &Address) -> Result<Vec<TxRecord>> {
        let (native, token) = tokio::join!(
            self.native_transactions(address),
            self.token_transactions(address),
        );
        let mut records = native?;
        records.extend(token?);
        Ok(collate(records))
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    async fn fetch_rows(&self, action: &str, params: &[(&str, String)]) -> Result<Vec<IndexerRow>> {
        let request = self
            .http
            .get(&self.base_url)
            .query(&[
                ("module", "account"),
                ("action", action),
                ("startblock", "0"),
                ("endblock", "99999999"),
                ("sort", "desc"),
            ])
            .query(&[("offset", PAGE_LIMIT)])
            .query(params);

        let response = request
            .send()
            .await
            .map_err(|e| fetch_error(action, &format!("transport failure: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(action, &format!("HTTP {status}")));
        }

        let envelope: IndexerEnvelope = response
            .json()
            .await
            .map_err(|e| fetch_error(action, &format!("unparseable response: {e}")))?;

        envelope_rows(envelope, action)
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

/// Unwraps an envelope into rows, treating "no transactions" as empty.
fn envelope_rows(envelope: IndexerEnvelope, action: &str) -> Result<Vec<IndexerRow>> {
    if envelope.status == "0" && envelope.message == NO_TRANSACTIONS {
        return Ok(Vec::new());
    }
    if envelope.status != "1" {
        return Err(fetch_error(
            action,
            &format!("indexer reported '{}'", envelope.message),
        ));
    }
    serde_json::from_value(envelope.result)
        .map_err(|e| fetch_error(action, &format!("malformed result rows: {e}")))
}

/// Maps `txlist` rows, dropping zero-value contract calls.
fn native_records(rows: &[IndexerRow], user: &Address) -> Result<Vec<TxRecord>> {
    rows.iter()
        .filter(|row| row.value != "0")
        .map(|row| map_row(row, user, TokenKind::Rbtc))
        .collect()
}

/// Maps `tokentx` rows.
fn token_records(rows: &[IndexerRow], user: &Address) -> Result<Vec<TxRecord>> {
    rows.iter()
        .map(|row| map_row(row, user, TokenKind::Lut))
        .collect()
}

fn map_row(row: &IndexerRow, user: &Address, token: TokenKind) -> Result<TxRecord> {
    let hash: TxHash = row.hash.parse().map_err(|_| malformed_row("hash"))?;
    let from: Address = row.from.parse().map_err(|_| malformed_row("from"))?;
    // Contract creations leave `to` empty.
    let to = if row.to.is_empty() {
        Address::ZERO
    } else {
        row.to.parse().map_err(|_| malformed_row("to"))?
    };
    let raw_amount: Wei = row.value.parse().map_err(|_| malformed_row("value"))?;
    let seconds: i64 = row
        .time_stamp
        .parse()
        .map_err(|_| malformed_row("timeStamp"))?;

    let status = if row.is_error == "1" {
        TxStatus::Failed
    } else if row
        .confirmations
        .parse::<u64>()
        .is_ok_and(|depth| depth < CONFIRMATION_DEPTH)
    {
        TxStatus::Pending
    } else {
        TxStatus::Confirmed
    };

    let incoming = to == *user;
    let (title, direction) = match token {
        TokenKind::Lut if incoming => ("Received LUT".to_string(), TxDirection::Incoming),
        TokenKind::Lut => ("Sent LUT".to_string(), TxDirection::Outgoing),
        TokenKind::Rbtc if !incoming && !row.input.is_empty() && row.input != "0x" => {
            ("Contract Interaction".to_string(), TxDirection::Contract)
        }
        TokenKind::Rbtc if incoming => ("Received RBTC".to_string(), TxDirection::Incoming),
        TokenKind::Rbtc => ("Sent RBTC".to_string(), TxDirection::Outgoing),
    };

    // Fee needs both gas fields; token rows often omit them.
    let fee = match (row.gas_used.parse::<u128>(), row.gas_price.parse::<u128>()) {
        (Ok(used), Ok(price)) => used.checked_mul(price).map(Wei::new),
        _ => None,
    };

    Ok(TxRecord {
        hash,
        token,
        direction,
        title,
        from,
        to,
        amount: raw_amount.format_units(token.decimals()),
        raw_amount,
        timestamp_ms: seconds.saturating_mul(1000),
        status,
        fee,
        usd_value: None,
    })
}

/// Deduplicates by hash (first occurrence wins) and sorts newest first.
fn collate(mut records: Vec<TxRecord>) -> Vec<TxRecord> {
    let mut seen = HashSet::new();
    records.retain(|record| seen.insert(record.hash));
    records.sort_by(|a, b| b.timestamp_ms.cmp(&a.timestamp_ms));
    records
}

fn fetch_error(action: &str, detail: &str) -> ParallelError {
    ParallelError::HistoryFetchError {
        reason: format!("{action}: {detail}"),
    }
}

fn malformed_row(field: &str) -> ParallelError {
    ParallelError::HistoryFetchError {
        reason: format!("indexed row has a missing or malformed field `{field}`"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
