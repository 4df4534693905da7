//! Core shared types for the Parallel governance wallet.
//!
//! This crate defines all fundamental types used across the workspace.
//! No other crate should define shared types — everything lives here.

pub mod config;
pub mod units;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub use units::Wei;

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// 20-byte chain address.
///
/// The primary identity of a wallet on the chain, derived from the last
/// 20 bytes of `keccak256(uncompressed_public_key[1..])`. Displayed and
/// serialized as `0x`-prefixed lowercase hex; the EIP-55 mixed-case form
/// is a display derivation computed in the crypto crate.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Address([u8; 20]);

impl Address {
    /// The fixed byte length of an address.
    pub const LEN: usize = 20;

    /// The all-zero address, used for absent counterparties.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Creates a new `Address` from raw bytes.
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = ParallelError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let bytes = hex::decode(digits).map_err(|_| ParallelError::InvalidAddress {
            reason: "invalid hex encoding".into(),
        })?;
        if bytes.len() != 20 {
            return Err(ParallelError::InvalidAddress {
                reason: format!("expected 20 bytes, got {}", bytes.len()),
            });
        }
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// TxHash
// ---------------------------------------------------------------------------

/// 32-byte transaction hash.
///
/// The natural identity key of a transaction record. Hex encodings seen
/// in the wild vary in case, so parsing is case-insensitive and two
/// hashes are equal whenever their bytes are — dedup never depends on
/// the string form.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct TxHash([u8; 32]);

impl TxHash {
    /// The fixed byte length of a transaction hash.
    pub const LEN: usize = 32;

    /// Creates a new `TxHash` from raw bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for TxHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for TxHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for TxHash {
    type Err = ParallelError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let bytes = hex::decode(digits).map_err(|_| ParallelError::HistoryFetchError {
            reason: "invalid hex encoding for transaction hash".into(),
        })?;
        if bytes.len() != 32 {
            return Err(ParallelError::HistoryFetchError {
                reason: format!("expected 32 bytes for transaction hash, got {}", bytes.len()),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// TokenKind
// ---------------------------------------------------------------------------

/// The two assets the wallet handles: the native coin and the
/// governance token. Both use 18 decimals on Rootstock.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// Native coin (plain value transfers).
    #[serde(rename = "RBTC")]
    Rbtc,
    /// Governance token (ERC-20 contract calls).
    #[serde(rename = "LUT")]
    Lut,
}

impl TokenKind {
    /// Display symbol as the backend and indexer know it.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Rbtc => "RBTC",
            Self::Lut => "LUT",
        }
    }

    /// Decimal places of the smallest unit.
    pub fn decimals(&self) -> u32 {
        18
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for TokenKind {
    type Err = ParallelError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "RBTC" => Ok(Self::Rbtc),
            "LUT" => Ok(Self::Lut),
            other => Err(ParallelError::ConfigError {
                reason: format!("unknown token symbol '{other}'"),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// TxStatus / TxDirection
// ---------------------------------------------------------------------------

/// Lifecycle state of a transaction record.
///
/// `Pending` records are synthesized locally right after broadcast;
/// `Confirmed` and `Failed` only ever arrive from the chain or indexer.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Confirmed,
    Failed,
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Direction of a transaction relative to the wallet owner.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum TxDirection {
    /// Value received by the wallet.
    #[serde(rename = "in")]
    Incoming,
    /// Value sent from the wallet.
    #[serde(rename = "out")]
    Outgoing,
    /// Contract interaction with no simple value flow.
    #[serde(rename = "contract")]
    Contract,
}

impl fmt::Display for TxDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Incoming => write!(f, "in"),
            Self::Outgoing => write!(f, "out"),
            Self::Contract => write!(f, "contract"),
        }
    }
}

// ---------------------------------------------------------------------------
// TxRecord
// ---------------------------------------------------------------------------

/// One row of the wallet's transaction history.
///
/// `hash` is the identity key: at most one record per hash survives
/// reconciliation. Timestamps are UTC milliseconds so locally-synthesized
/// pending records and indexer rows sort on the same axis.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TxRecord {
    pub hash: TxHash,
    pub token: TokenKind,
    pub direction: TxDirection,
    /// Display label, e.g. `"Sent LUT"` or `"Received RBTC"`.
    pub title: String,
    pub from: Address,
    pub to: Address,
    /// Formatted decimal amount (display only, never arithmetic).
    pub amount: String,
    /// Exact amount in the smallest unit.
    pub raw_amount: Wei,
    /// UTC milliseconds since epoch.
    pub timestamp_ms: i64,
    pub status: TxStatus,
    /// Total fee paid, once known (gas_used × gas_price).
    pub fee: Option<Wei>,
    /// Fiat estimate at display time, if a quote was available.
    pub usd_value: Option<String>,
}

// ---------------------------------------------------------------------------
// TokenBalance
// ---------------------------------------------------------------------------

/// A fetched balance: exact raw units plus the display string derived
/// from them. `formatted` is never used for arithmetic.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenBalance {
    pub token: TokenKind,
    pub raw: Wei,
    pub formatted: String,
}

// ---------------------------------------------------------------------------
// FeeEstimate
// ---------------------------------------------------------------------------

/// Result of fee estimation for a candidate send.
///
/// Invariant: `total_fee == gas_limit × gas_price` exactly, and
/// `gas_limit` already includes the safety buffer over the raw network
/// estimate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeeEstimate {
    pub gas_limit: u64,
    /// Wei per gas unit as the node suggested it (no buffer).
    pub gas_price: Wei,
    /// `gas_limit × gas_price` in wei.
    pub total_fee: Wei,
    /// Human-readable total in native-coin units.
    pub formatted_fee: String,
}

// ---------------------------------------------------------------------------
// VoteChoice
// ---------------------------------------------------------------------------

/// The two ballot options every proposal carries.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum VoteChoice {
    #[serde(rename = "FOR")]
    For,
    #[serde(rename = "AGAINST")]
    Against,
}

impl VoteChoice {
    /// Wire form as the backend verifier expects it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::For => "FOR",
            Self::Against => "AGAINST",
        }
    }
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VoteChoice {
    type Err = ParallelError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FOR" => Ok(Self::For),
            "AGAINST" => Ok(Self::Against),
            other => Err(ParallelError::ConfigError {
                reason: format!("unknown vote choice '{other}' (expected FOR or AGAINST)"),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Proposal
// ---------------------------------------------------------------------------

/// Allowed proposal categories.
pub const PROPOSAL_CATEGORIES: [&str; 4] = ["Finance", "Operations", "Governance", "Other"];

/// Lifecycle state of a proposal, owned by the backend.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProposalStatus {
    Upcoming,
    Active,
    Closed,
    Passed,
    Failed,
}

impl ProposalStatus {
    /// Whether ballots are currently being accepted.
    pub fn accepts_votes(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Upcoming => "UPCOMING",
            Self::Active => "ACTIVE",
            Self::Closed => "CLOSED",
            Self::Passed => "PASSED",
            Self::Failed => "FAILED",
        };
        write!(f, "{label}")
    }
}

/// The caller's own recorded ballot, echoed back by the backend on
/// authenticated proposal fetches.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MyVote {
    pub choice: VoteChoice,
    /// Voting weight in raw token units (decimal string).
    #[serde(rename = "weightRaw")]
    pub weight_raw: String,
}

/// A governance proposal as returned by the backend.
///
/// The backend owns tallying and state transitions; clients never compute
/// results locally. Tally fields are decimal strings of raw 18-decimal
/// token units.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Proposal {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// Author address as the backend reports it (string form preserved).
    #[serde(rename = "authorAddress")]
    pub author: String,
    /// Unix milliseconds.
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    /// Voting window open, unix milliseconds.
    #[serde(rename = "startTime")]
    pub start_time: i64,
    /// Voting window close, unix milliseconds.
    #[serde(rename = "endTime")]
    pub end_time: i64,
    pub status: ProposalStatus,
    /// Block height used as the voting-power snapshot.
    #[serde(default, rename = "snapshotBlock")]
    pub snapshot_block: Option<u64>,
    #[serde(default, rename = "totalForRaw")]
    pub total_for_raw: String,
    #[serde(default, rename = "totalAgainstRaw")]
    pub total_against_raw: String,
    #[serde(default, rename = "totalVoters")]
    pub total_voters: u64,
    /// Caller's voting power at the snapshot, on authenticated fetches.
    #[serde(default, rename = "userVotingPowerRaw")]
    pub user_voting_power_raw: Option<String>,
    /// Caller's recorded ballot, on authenticated fetches.
    #[serde(default, rename = "myVote")]
    pub my_vote: Option<MyVote>,
}

// ---------------------------------------------------------------------------
// ProposalUpdate
// ---------------------------------------------------------------------------

/// Progress status attached to a proposal update.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum UpdateStatus {
    Planning,
    #[serde(rename = "In Progress")]
    InProgress,
    Delayed,
    Completed,
    Started,
}

impl fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Planning => write!(f, "Planning"),
            Self::InProgress => write!(f, "In Progress"),
            Self::Delayed => write!(f, "Delayed"),
            Self::Completed => write!(f, "Completed"),
            Self::Started => write!(f, "Started"),
        }
    }
}

impl FromStr for UpdateStatus {
    type Err = ParallelError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Planning" => Ok(Self::Planning),
            "In Progress" => Ok(Self::InProgress),
            "Delayed" => Ok(Self::Delayed),
            "Completed" => Ok(Self::Completed),
            "Started" => Ok(Self::Started),
            other => Err(ParallelError::ConfigError {
                reason: format!("unknown update status '{other}'"),
            }),
        }
    }
}

/// An implementation-progress note posted against a proposal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProposalUpdate {
    pub id: String,
    #[serde(rename = "proposalId")]
    pub proposal_id: String,
    pub status: UpdateStatus,
    /// Markdown body of the note.
    #[serde(default)]
    pub content: String,
    /// Author address as recorded by the backend.
    #[serde(default, rename = "authorAddress")]
    pub author: Option<String>,
    /// Unix milliseconds, set by the backend.
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<i64>,
}

// ---------------------------------------------------------------------------
// ParallelError
// ---------------------------------------------------------------------------

/// Central error type for the Parallel wallet core.
///
/// All crates in the workspace convert their internal errors into variants
/// of this enum, ensuring a unified error handling surface.
#[derive(Debug, Error)]
pub enum ParallelError {
    /// Mnemonic import failed word-count, wordlist, or checksum validation.
    #[error("invalid mnemonic: {reason}")]
    InvalidMnemonic {
        /// Human-readable description of the validation failure.
        reason: String,
    },

    /// The platform secure-storage subsystem is inaccessible.
    #[error("storage unavailable: {reason}")]
    StorageUnavailable {
        /// Human-readable description of the storage failure.
        reason: String,
    },

    /// Malformed key material or a signing-library failure.
    #[error("signing error: {reason}")]
    SigningError {
        /// Human-readable description of the signing failure.
        reason: String,
    },

    /// Fee estimation failed beyond what the fallback floor can absorb.
    #[error("estimation error: {reason}")]
    EstimationError {
        /// Human-readable description of the estimation failure.
        reason: String,
    },

    /// The network rejected or failed to relay a signed payload, either a
    /// raw transaction or a governance submission.
    #[error("broadcast error: {reason}")]
    BroadcastError {
        /// Human-readable description of the broadcast failure.
        reason: String,
    },

    /// The indexer or RPC history source is unreachable or malformed.
    #[error("history fetch error: {reason}")]
    HistoryFetchError {
        /// Human-readable description of the fetch failure.
        reason: String,
    },

    /// A chain read failed on every candidate endpoint, or a governance
    /// backend read failed.
    #[error("rpc error: {reason}")]
    RpcError {
        /// Human-readable description of the RPC failure.
        reason: String,
    },

    /// Backend sign-in (nonce/verify) failed, the session token is bad,
    /// or a local PIN gate rejected the caller.
    #[error("auth error: {reason}")]
    AuthError {
        /// Human-readable description of the authentication failure.
        reason: String,
    },

    /// The provided address is malformed.
    #[error("invalid address: {reason}")]
    InvalidAddress {
        /// Human-readable description of why the address is invalid.
        reason: String,
    },

    /// A configuration value is invalid or missing.
    #[error("config error: {reason}")]
    ConfigError {
        /// Human-readable description of the configuration problem.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Result alias
// ---------------------------------------------------------------------------

/// Convenience result type using [`ParallelError`].
pub type Result<T> = std::result::Result<T, ParallelError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_roundtrip_hex() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let bytes = [0xABu8; 20];
        let addr = Address::new(bytes);
        let hex_str = addr.to_string();
        assert!(hex_str.starts_with("0x"));
        let parsed: Address = hex_str.parse()?;
        assert_eq!(addr, parsed);
        Ok(())
    }

    #[test]
    fn address_parses_without_prefix() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let addr: Address = "4dd73b9a98f401fb3c53df33a9e05bea1419eb5e".parse()?;
        assert_eq!(
            addr.to_string(),
            "0x4dd73b9a98f401fb3c53df33a9e05bea1419eb5e"
        );
        Ok(())
    }

    #[test]
    fn address_parse_is_case_insensitive() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let lower: Address = "0x4dd73b9a98f401fb3c53df33a9e05bea1419eb5e".parse()?;
        let upper: Address = "0x4DD73B9A98F401FB3C53DF33A9E05BEA1419EB5E".parse()?;
        assert_eq!(lower, upper);
        Ok(())
    }

    #[test]
    fn address_invalid_hex_length() {
        let result: std::result::Result<Address, _> = "0xabcd".parse();
        assert!(result.is_err());
    }

    #[test]
    fn address_invalid_hex_chars() {
        let result: std::result::Result<Address, _> = "0xzz".parse();
        assert!(result.is_err());
    }

    #[test]
    fn tx_hash_case_insensitive_identity() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let lower: TxHash =
            "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".parse()?;
        let upper: TxHash =
            "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA".parse()?;
        assert_eq!(lower, upper);
        Ok(())
    }

    #[test]
    fn tx_hash_serde_as_hex_string() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let hash = TxHash::new([0x11u8; 32]);
        let json = serde_json::to_string(&hash)?;
        assert_eq!(
            json,
            "\"0x1111111111111111111111111111111111111111111111111111111111111111\""
        );
        let parsed: TxHash = serde_json::from_str(&json)?;
        assert_eq!(hash, parsed);
        Ok(())
    }

    #[test]
    fn token_kind_symbols() {
        assert_eq!(TokenKind::Rbtc.symbol(), "RBTC");
        assert_eq!(TokenKind::Lut.symbol(), "LUT");
        assert_eq!(TokenKind::Rbtc.decimals(), 18);
        assert_eq!(TokenKind::Lut.decimals(), 18);
    }

    #[test]
    fn tx_direction_serde_wire_names() -> std::result::Result<(), Box<dyn std::error::Error>> {
        assert_eq!(serde_json::to_string(&TxDirection::Incoming)?, "\"in\"");
        assert_eq!(serde_json::to_string(&TxDirection::Outgoing)?, "\"out\"");
        assert_eq!(serde_json::to_string(&TxDirection::Contract)?, "\"contract\"");
        Ok(())
    }

    #[test]
    fn vote_choice_wire_form() {
        assert_eq!(VoteChoice::For.as_str(), "FOR");
        assert_eq!(VoteChoice::Against.as_str(), "AGAINST");
        assert!("for".parse::<VoteChoice>().is_ok());
        assert!("maybe".parse::<VoteChoice>().is_err());
    }

    #[test]
    fn update_status_roundtrip() -> std::result::Result<(), Box<dyn std::error::Error>> {
        for status in [
            UpdateStatus::Planning,
            UpdateStatus::InProgress,
            UpdateStatus::Delayed,
            UpdateStatus::Completed,
            UpdateStatus::Started,
        ] {
            let parsed: UpdateStatus = status.to_string().parse()?;
            assert_eq!(status, parsed);
        }
        Ok(())
    }

    #[test]
    fn update_status_serde_uses_display_names() -> serde_json::Result<()> {
        assert_eq!(
            serde_json::to_string(&UpdateStatus::InProgress)?,
            "\"In Progress\""
        );
        Ok(())
    }

    #[test]
    fn error_display_carries_the_reason() {
        let err = ParallelError::InvalidMnemonic {
            reason: "11 words".into(),
        };
        assert!(err.to_string().contains("11 words"));
        assert!(err.to_string().starts_with("invalid mnemonic"));
    }

    #[test]
    fn proposal_deserializes_with_missing_optionals(
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let json = r#"{
            "id": "p1",
            "title": "Fund the relay",
            "authorAddress": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
            "createdAt": 1700000000000,
            "startTime": 1700000000000,
            "endTime": 1700604800000,
            "status": "ACTIVE"
        }"#;
        let proposal: Proposal = serde_json::from_str(json)?;
        assert_eq!(proposal.id, "p1");
        assert!(proposal.status.accepts_votes());
        assert!(proposal.description.is_empty());
        assert!(proposal.snapshot_block.is_none());
        assert!(proposal.my_vote.is_none());
        assert_eq!(proposal.total_voters, 0);
        Ok(())
    }

    #[test]
    fn authenticated_proposal_carries_the_callers_ballot(
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let json = r#"{
            "id": "p2",
            "title": "Treasury rebalance",
            "category": "Finance",
            "authorAddress": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
            "createdAt": 1700000000000,
            "startTime": 1700000000000,
            "endTime": 1700604800000,
            "status": "CLOSED",
            "snapshotBlock": 6412345,
            "totalForRaw": "5000000000000000000000",
            "totalAgainstRaw": "1000000000000000000000",
            "totalVoters": 7,
            "userVotingPowerRaw": "2500000000000000000000",
            "myVote": { "choice": "FOR", "weightRaw": "2500000000000000000000" }
        }"#;
        let proposal: Proposal = serde_json::from_str(json)?;
        assert_eq!(proposal.snapshot_block, Some(6_412_345));
        assert!(!proposal.status.accepts_votes());
        let ballot = proposal.my_vote.ok_or("myVote missing")?;
        assert_eq!(ballot.choice, VoteChoice::For);
        assert_eq!(ballot.weight_raw, "2500000000000000000000");
        Ok(())
    }

    #[test]
    fn proposal_update_uses_backend_field_names(
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let json = r#"{
            "id": "u1",
            "proposalId": "p1",
            "status": "In Progress",
            "content": "Contract deployed to testnet.",
            "authorAddress": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
            "createdAt": 1700000100000
        }"#;
        let update: ProposalUpdate = serde_json::from_str(json)?;
        assert_eq!(update.status, UpdateStatus::InProgress);
        assert_eq!(update.content, "Contract deployed to testnet.");
        assert_eq!(update.created_at, Some(1_700_000_100_000));
        Ok(())
    }
}
