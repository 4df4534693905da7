//! JSON-RPC transport with ranked endpoint failover.
//!
//! One [`RpcClient`] serves every chain read and write in the workspace.
//! Whole-client calls walk the configured endpoints in rank order and
//! return the first answer; transport failures, HTTP failures, and
//! node-level error objects all surface as [`ParallelError::RpcError`]
//! with the endpoint and method named, never as vendor error strings for
//! callers to match on. The log scanner drives endpoints individually via
//! the `*_on` methods because its retry strategy narrows the scan window
//! per endpoint.

use std::time::Duration;

use serde_json::{json, Value};
use tracing::warn;

use parallel_types::config::ChainProfile;
use parallel_types::{Address, ParallelError, Result, TxHash, Wei};

// ---------------------------------------------------------------------------
// RpcClient
// ---------------------------------------------------------------------------

/// HTTP JSON-RPC client over a ranked endpoint list, best first.
pub struct RpcClient {
    http: reqwest::Client,
    endpoints: Vec<String>,
}

impl RpcClient {
    /// Builds a client over `endpoints` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::ConfigError`] when the endpoint list is
    /// empty or the HTTP client cannot be constructed.
    pub fn new(endpoints: Vec<String>, timeout_secs: u64) -> Result<Self> {
        if endpoints.is_empty() {
            return Err(ParallelError::ConfigError {
                reason: "rpc client needs at least one endpoint".into(),
            });
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ParallelError::ConfigError {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { http, endpoints })
    }

    /// Builds a client from a chain profile's ranked endpoint list.
    ///
    /// # Errors
    ///
    /// Same as [`RpcClient::new`].
    pub fn from_profile(profile: &ChainProfile, timeout_secs: u64) -> Result<Self> {
        Self::new(profile.rpc_endpoints.clone(), timeout_secs)
    }

    /// The configured endpoints in rank order.
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    // -----------------------------------------------------------------------
    // Core calls
    // -----------------------------------------------------------------------

    /// Calls `method` on each endpoint in rank order and returns the first
    /// successful result.
    ///
    /// # Errors
    ///
    /// Returns the last endpoint's [`ParallelError::RpcError`] once every
    /// endpoint has failed.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let mut last_error = None;
        for endpoint in &self.endpoints {
            match self.call_on(endpoint, method, params.clone()).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!(endpoint = %endpoint, method, error = %e, "endpoint failed, trying next");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| ParallelError::RpcError {
            reason: "no endpoints configured".into(),
        }))
    }

    /// Calls `method` on one specific endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::RpcError`] on transport failure, a non-2xx
    /// HTTP status, an unparseable body, a node error object, or a missing
    /// result.
    pub async fn call_on(&self, endpoint: &str, method: &str, params: Value) -> Result<Value> {
        let request = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1,
        });

        let response = self
            .http
            .post(endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| rpc_error(endpoint, method, &format!("transport failure: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(rpc_error(endpoint, method, &format!("HTTP {status}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| rpc_error(endpoint, method, &format!("unparseable response: {e}")))?;

        if let Some(error) = body.get("error") {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(rpc_error(
                endpoint,
                method,
                &format!("node error {code}: {message}"),
            ));
        }

        match body.get("result") {
            Some(result) if !result.is_null() => Ok(result.clone()),
            _ => Err(rpc_error(endpoint, method, "response carries no result")),
        }
    }

    // -----------------------------------------------------------------------
    // Chain reads
    // -----------------------------------------------------------------------

    /// The node's suggested gas price in wei (`eth_gasPrice`).
    pub async fn gas_price(&self) -> Result<Wei> {
        let result = self.call("eth_gasPrice", json!([])).await?;
        Wei::from_hex_quantity(quantity_str(&result)?)
    }

    /// The latest block number (`eth_blockNumber`).
    pub async fn block_number(&self) -> Result<u64> {
        let result = self.call("eth_blockNumber", json!([])).await?;
        parse_quantity_u64(quantity_str(&result)?)
    }

    /// Native-coin balance at the latest block (`eth_getBalance`).
    pub async fn balance(&self, address: &Address) -> Result<Wei> {
        let result = self
            .call("eth_getBalance", json!([address.to_string(), "latest"]))
            .await?;
        Wei::from_hex_quantity(quantity_str(&result)?)
    }

    /// Read-only contract call at the latest block (`eth_call`), returning
    /// the raw hex return data.
    pub async fn call_contract(&self, to: &Address, data: &[u8]) -> Result<String> {
        let call = json!({
            "to": to.to_string(),
            "data": format!("0x{}", hex::encode(data)),
        });
        let result = self.call("eth_call", json!([call, "latest"])).await?;
        Ok(quantity_str(&result)?.to_string())
    }

    /// Gas estimate for a candidate transaction (`eth_estimateGas`).
    /// `data` is omitted from the call object for plain value transfers.
    pub async fn estimate_gas(
        &self,
        from: &Address,
        to: &Address,
        value: Wei,
        data: Option<&[u8]>,
    ) -> Result<u64> {
        let mut call = json!({
            "from": from.to_string(),
            "to": to.to_string(),
            "value": value.to_hex_quantity(),
        });
        if let Some(data) = data {
            call["data"] = Value::String(format!("0x{}", hex::encode(data)));
        }
        let result = self.call("eth_estimateGas", json!([call])).await?;
        parse_quantity_u64(quantity_str(&result)?)
    }

    /// Next nonce for `address`, counting queued transactions
    /// (`eth_getTransactionCount` at the `pending` tag).
    pub async fn transaction_count(&self, address: &Address) -> Result<u64> {
        let result = self
            .call(
                "eth_getTransactionCount",
                json!([address.to_string(), "pending"]),
            )
            .await?;
        parse_quantity_u64(quantity_str(&result)?)
    }

    // -----------------------------------------------------------------------
    // Chain writes
    // -----------------------------------------------------------------------

    /// Submits a signed raw transaction (`eth_sendRawTransaction`) and
    /// returns the transaction hash the node assigned.
    pub async fn send_raw_transaction(&self, raw: &str) -> Result<TxHash> {
        let result = self.call("eth_sendRawTransaction", json!([raw])).await?;
        quantity_str(&result)?
            .parse()
            .map_err(|_| ParallelError::RpcError {
                reason: "node returned a malformed transaction hash".into(),
            })
    }

    // -----------------------------------------------------------------------
    // Endpoint-scoped calls for the log scanner
    // -----------------------------------------------------------------------

    /// The latest block number as one endpoint reports it.
    pub async fn block_number_on(&self, endpoint: &str) -> Result<u64> {
        let result = self.call_on(endpoint, "eth_blockNumber", json!([])).await?;
        parse_quantity_u64(quantity_str(&result)?)
    }

    /// Unix timestamp in seconds of block `number`
    /// (`eth_getBlockByNumber` without transaction bodies).
    pub async fn block_timestamp_on(&self, endpoint: &str, number: u64) -> Result<u64> {
        let result = self
            .call_on(
                endpoint,
                "eth_getBlockByNumber",
                json!([format!("0x{number:x}"), false]),
            )
            .await?;
        let timestamp = result
            .get("timestamp")
            .and_then(Value::as_str)
            .ok_or_else(|| ParallelError::RpcError {
                reason: format!("block 0x{number:x} carries no timestamp"),
            })?;
        parse_quantity_u64(timestamp)
    }

    /// Runs an `eth_getLogs` filter on one endpoint.
    pub async fn logs_on(&self, endpoint: &str, filter: Value) -> Result<Vec<LogEntry>> {
        let result = self
            .call_on(endpoint, "eth_getLogs", json!([filter]))
            .await?;
        let entries = result.as_array().ok_or_else(|| ParallelError::RpcError {
            reason: "eth_getLogs did not return an array".into(),
        })?;
        entries.iter().map(parse_log).collect()
    }
}

// ---------------------------------------------------------------------------
// LogEntry
// ---------------------------------------------------------------------------

/// One `eth_getLogs` entry, reduced to the fields the transfer scanner
/// reads. `(transaction_hash, log_index)` identifies a log uniquely.
#[derive(Clone, Debug)]
pub struct LogEntry {
    pub topics: Vec<String>,
    pub data: String,
    pub block_number: u64,
    pub transaction_hash: TxHash,
    pub log_index: u64,
}

fn parse_log(value: &Value) -> Result<LogEntry> {
    let topics = value
        .get("topics")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed_log("topics"))?
        .iter()
        .map(|t| t.as_str().map(str::to_string).ok_or_else(|| malformed_log("topics")))
        .collect::<Result<Vec<_>>>()?;

    let data = value
        .get("data")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed_log("data"))?
        .to_string();

    let block_number = value
        .get("blockNumber")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed_log("blockNumber"))
        .and_then(parse_quantity_u64)?;

    let transaction_hash = value
        .get("transactionHash")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed_log("transactionHash"))?
        .parse::<TxHash>()
        .map_err(|_| malformed_log("transactionHash"))?;

    let log_index = value
        .get("logIndex")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed_log("logIndex"))
        .and_then(parse_quantity_u64)?;

    Ok(LogEntry {
        topics,
        data,
        block_number,
        transaction_hash,
        log_index,
    })
}

fn malformed_log(field: &str) -> ParallelError {
    ParallelError::RpcError {
        reason: format!("log entry missing or malformed field `{field}`"),
    }
}

// ---------------------------------------------------------------------------
// Quantity parsing
// ---------------------------------------------------------------------------

fn quantity_str(value: &Value) -> Result<&str> {
    value.as_str().ok_or_else(|| ParallelError::RpcError {
        reason: format!("expected a string result, got {value}"),
    })
}

fn parse_quantity_u64(text: &str) -> Result<u64> {
    let digits = text
        .strip_prefix("0x")
        .ok_or_else(|| ParallelError::RpcError {
            reason: format!("hex quantity missing 0x prefix: {text}"),
        })?;
    if digits.is_empty() {
        return Err(ParallelError::RpcError {
            reason: "empty hex quantity".into(),
        });
    }
    u64::from_str_radix(digits, 16).map_err(|e| ParallelError::RpcError {
        reason: format!("invalid hex quantity {text}: {e}"),
    })
}

fn rpc_error(endpoint: &str, method: &str, detail: &str) -> ParallelError {
    ParallelError::RpcError {
        reason: format!("{method} via {endpoint}: {detail}"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
