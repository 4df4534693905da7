//! Application configuration with sensible defaults.
//!
//! Two layers: [`AppConfig`] holds the app-level knobs (data directory,
//! governance backend, mock-balance switch) and [`ChainProfile`] holds
//! everything tied to one chain (id, ranked RPC endpoints, indexer,
//! token registry). Both load from a JSON file and validate before use;
//! CLI flags override file values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Address, ParallelError, Result};

// ---------------------------------------------------------------------------
// Chain constants
// ---------------------------------------------------------------------------

/// Rootstock mainnet chain id.
pub const MAINNET_CHAIN_ID: u64 = 30;

/// Rootstock testnet chain id.
pub const TESTNET_CHAIN_ID: u64 = 31;

/// Public mainnet RPC endpoint.
pub const MAINNET_RPC_URL: &str = "https://public-node.rsk.co";

/// Public testnet RPC endpoint.
pub const TESTNET_RPC_URL: &str = "https://public-node.testnet.rsk.co";

/// Blockscout-style indexer for mainnet.
pub const MAINNET_INDEXER_URL: &str = "https://rootstock.blockscout.com/api";

/// Blockscout-style indexer for testnet.
pub const TESTNET_INDEXER_URL: &str = "https://rootstock-testnet.blockscout.com/api";

/// LUT governance token contract (same address on both networks).
pub const LUT_CONTRACT: Address = Address::new([
    0x4d, 0xd7, 0x3b, 0x9a, 0x98, 0xf4, 0x01, 0xfb, 0x3c, 0x53, 0xdf, 0x33, 0xa9, 0xe0, 0x5b,
    0xea, 0x14, 0x19, 0xeb, 0x5e,
]);

// ---------------------------------------------------------------------------
// ChainProfile
// ---------------------------------------------------------------------------

/// Everything the gateway needs to talk to one chain.
///
/// `rpc_endpoints` is an ordered failover list: calls walk it front to
/// back and the first endpoint that answers wins.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainProfile {
    /// EIP-155 chain id baked into every signed transaction.
    pub chain_id: u64,

    /// Ranked JSON-RPC endpoints, best first.
    pub rpc_endpoints: Vec<String>,

    /// Blockscout-style indexer base URL (`?module=account&action=...`).
    pub indexer_url: String,

    /// ERC-20 contract of the governance token.
    pub lut_contract: Address,
}

impl ChainProfile {
    /// Rootstock mainnet profile.
    pub fn mainnet() -> Self {
        Self {
            chain_id: MAINNET_CHAIN_ID,
            rpc_endpoints: vec![MAINNET_RPC_URL.to_string()],
            indexer_url: MAINNET_INDEXER_URL.to_string(),
            lut_contract: LUT_CONTRACT,
        }
    }

    /// Rootstock testnet profile.
    pub fn testnet() -> Self {
        Self {
            chain_id: TESTNET_CHAIN_ID,
            rpc_endpoints: vec![TESTNET_RPC_URL.to_string()],
            indexer_url: TESTNET_INDEXER_URL.to_string(),
            lut_contract: LUT_CONTRACT,
        }
    }

    /// Validates all profile values.
    ///
    /// Returns an error if any value is structurally unusable.
    pub fn validate(&self) -> Result<()> {
        if self.chain_id == 0 {
            return Err(ParallelError::ConfigError {
                reason: "chain_id must be greater than 0".into(),
            });
        }

        if self.rpc_endpoints.is_empty() {
            return Err(ParallelError::ConfigError {
                reason: "rpc_endpoints must contain at least one endpoint".into(),
            });
        }

        if self.rpc_endpoints.iter().any(|e| e.trim().is_empty()) {
            return Err(ParallelError::ConfigError {
                reason: "rpc_endpoints must not contain empty entries".into(),
            });
        }

        if self.indexer_url.trim().is_empty() {
            return Err(ParallelError::ConfigError {
                reason: "indexer_url must not be empty".into(),
            });
        }

        Ok(())
    }
}

impl Default for ChainProfile {
    fn default() -> Self {
        Self::mainnet()
    }
}

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

/// Global application configuration.
///
/// All values are configurable via a JSON config file or CLI flags;
/// the defaults are usable out of the box against mainnet.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the encrypted store.
    pub data_dir: PathBuf,

    /// Governance backend base URL. Empty means governance operations
    /// are unavailable until configured.
    pub governance_url: String,

    /// Serve fixed development balances instead of querying the chain.
    pub use_mock_balances: bool,

    /// Per-request timeout for all HTTP traffic, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            governance_url: String::new(),
            use_mock_balances: false,
            request_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Loads configuration from a JSON file, filling absent fields with
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::ConfigError`] if the file cannot be read
    /// or is not valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ParallelError::ConfigError {
            reason: format!("failed to read config file: {e}"),
        })?;

        let file: AppConfigFile =
            serde_json::from_str(&text).map_err(|e| ParallelError::ConfigError {
                reason: format!("invalid config JSON: {e}"),
            })?;

        let defaults = Self::default();
        Ok(Self {
            data_dir: file.data_dir.map(PathBuf::from).unwrap_or(defaults.data_dir),
            governance_url: file.governance_url.unwrap_or(defaults.governance_url),
            use_mock_balances: file
                .use_mock_balances
                .unwrap_or(defaults.use_mock_balances),
            request_timeout_secs: file
                .request_timeout_secs
                .unwrap_or(defaults.request_timeout_secs),
        })
    }

    /// Validates all configuration values.
    ///
    /// Returns an error if any value is outside its acceptable range.
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ParallelError::ConfigError {
                reason: "data_dir must not be empty".into(),
            });
        }

        if self.request_timeout_secs == 0 {
            return Err(ParallelError::ConfigError {
                reason: "request_timeout_secs must be greater than 0".into(),
            });
        }

        Ok(())
    }
}

/// JSON config file format. Every field optional; absent fields take
/// their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct AppConfigFile {
    data_dir: Option<String>,
    governance_url: Option<String>,
    use_mock_balances: Option<bool>,
    request_timeout_secs: Option<u64>,
}

/// Platform-specific default data directory.
fn default_data_dir() -> PathBuf {
    if cfg!(target_os = "linux") {
        if let Some(home) = dirs::home_dir() {
            return home.join(".parallel");
        }
    }
    if let Some(data) = dirs::data_dir() {
        return data.join("Parallel");
    }
    PathBuf::from("parallel-data")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
