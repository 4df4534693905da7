//! Fee estimation for candidate sends.
//!
//! Quotes follow the send state machine: each input change starts a new
//! estimation round, and only the newest round may publish its result.
//! [`EstimateSequencer`] hands out the generation numbers that enforce
//! this; the estimator itself is stateless.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::warn;

use parallel_protocol::erc20;
use parallel_types::{Address, FeeEstimate, ParallelError, Result, TokenKind, Wei};

use crate::rpc::RpcClient;

/// Gas price assumed when the node reports none (0.06 gwei).
pub const DEFAULT_GAS_PRICE: Wei = Wei::new(60_000_000);

/// Fallback gas limit for a plain value transfer.
pub const NATIVE_FALLBACK_GAS_LIMIT: u64 = 21_000;

/// Fallback gas limit for a token transfer call.
pub const TOKEN_FALLBACK_GAS_LIMIT: u64 = 100_000;

// ---------------------------------------------------------------------------
// FeeRequest / FeeEstimator
// ---------------------------------------------------------------------------

/// A candidate send awaiting a fee quote.
#[derive(Clone, Debug)]
pub struct FeeRequest {
    pub token: TokenKind,
    pub from: Address,
    pub to: Address,
    /// Exact amount in the smallest unit of `token`.
    pub amount: Wei,
}

/// Quotes gas price and gas limit for candidate sends.
pub struct FeeEstimator<'a> {
    rpc: &'a RpcClient,
    lut_contract: Address,
}

impl<'a> FeeEstimator<'a> {
    pub fn new(rpc: &'a RpcClient, lut_contract: Address) -> Self {
        Self { rpc, lut_contract }
    }

    /// Produces a [`FeeEstimate`] for `request`.
    ///
    /// The gas price is the node's suggestion, or [`DEFAULT_GAS_PRICE`]
    /// when the node reports zero or nothing. The gas limit is the network
    /// estimate when the node accepts the call, otherwise the per-kind
    /// fallback floor; the +10% safety margin applies to whichever limit
    /// is used. `total_fee` is exactly `gas_limit × gas_price`.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::EstimationError`] when the gas price is
    /// unavailable on every endpoint or the fee arithmetic overflows. A
    /// rejected gas estimation alone never fails the quote.
    pub async fn estimate(&self, request: &FeeRequest) -> Result<FeeEstimate> {
        let suggested =
            self.rpc
                .gas_price()
                .await
                .map_err(|e| ParallelError::EstimationError {
                    reason: format!("gas price unavailable: {e}"),
                })?;
        let gas_price = if suggested > Wei::ZERO {
            suggested
        } else {
            DEFAULT_GAS_PRICE
        };

        let gas_limit = match self.network_gas_limit(request).await {
            Ok(estimate) => buffer_gas_limit(estimate),
            Err(e) => {
                let fallback = fallback_gas_limit(request.token);
                warn!(error = %e, fallback, "gas estimation failed, using fallback limit");
                buffer_gas_limit(fallback)
            }
        };

        let total_fee =
            gas_price
                .checked_mul_gas(gas_limit)
                .ok_or_else(|| ParallelError::EstimationError {
                    reason: "total fee overflows the wei range".into(),
                })?;

        Ok(FeeEstimate {
            gas_limit,
            gas_price,
            total_fee,
            formatted_fee: total_fee.format_units(TokenKind::Rbtc.decimals()),
        })
    }

    /// Raw network gas estimate: a plain value transfer for the native
    /// coin, a `transfer(to, amount)` call for the token.
    async fn network_gas_limit(&self, request: &FeeRequest) -> Result<u64> {
        match request.token {
            TokenKind::Rbtc => {
                self.rpc
                    .estimate_gas(&request.from, &request.to, request.amount, None)
                    .await
            }
            TokenKind::Lut => {
                let data = erc20::encode_transfer(&request.to, request.amount);
                self.rpc
                    .estimate_gas(&request.from, &self.lut_contract, Wei::ZERO, Some(&data))
                    .await
            }
        }
    }
}

/// Applies the +10% safety margin (integer math, truncating).
pub fn buffer_gas_limit(limit: u64) -> u64 {
    (u128::from(limit) * 110 / 100) as u64
}

/// The per-kind floor used when the node rejects estimation.
pub fn fallback_gas_limit(token: TokenKind) -> u64 {
    match token {
        TokenKind::Rbtc => NATIVE_FALLBACK_GAS_LIMIT,
        TokenKind::Lut => TOKEN_FALLBACK_GAS_LIMIT,
    }
}

// ---------------------------------------------------------------------------
// EstimateSequencer
// ---------------------------------------------------------------------------

/// Generation counter for in-flight estimation rounds.
///
/// Every input change calls [`EstimateSequencer::begin`] before issuing
/// a quote; when the quote returns, the caller publishes it only if
/// [`EstimateSequencer::is_current`] still holds. A slow quote from an
/// older round can therefore never overwrite a newer one.
pub struct EstimateSequencer {
    current: AtomicU64,
}

impl EstimateSequencer {
    pub fn new() -> Self {
        Self {
            current: AtomicU64::new(0),
        }
    }

    /// Starts a new round, invalidating all earlier ones.
    pub fn begin(&self) -> u64 {
        self.current.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether `generation` is still the newest round.
    pub fn is_current(&self, generation: u64) -> bool {
        self.current.load(Ordering::SeqCst) == generation
    }
}

impl Default for EstimateSequencer {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
