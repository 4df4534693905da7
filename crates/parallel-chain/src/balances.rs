//! Token balance reads.
//!
//! Native-coin balances come from `eth_getBalance`, governance-token
//! balances from an `eth_call` of `balanceOf`. A deterministic mock
//! source sits behind a flag so development builds render stable numbers
//! without touching the chain.

use parallel_protocol::erc20;
use parallel_types::{Address, Result, TokenBalance, TokenKind, Wei};

use crate::rpc::RpcClient;

/// Development balance served for the native coin when mocking is on.
pub const MOCK_RBTC_BALANCE: Wei = Wei::new(1_250_750_000_000_000_000);

/// Development balance served for the governance token when mocking is on.
pub const MOCK_LUT_BALANCE: Wei = Wei::new(15_750_000_000_000_000_000_000);

/// Reads balances for one wallet address.
pub struct BalanceReader<'a> {
    rpc: &'a RpcClient,
    lut_contract: Address,
    use_mock: bool,
}

impl<'a> BalanceReader<'a> {
    pub fn new(rpc: &'a RpcClient, lut_contract: Address, use_mock: bool) -> Self {
        Self {
            rpc,
            lut_contract,
            use_mock,
        }
    }

    /// Native-coin balance at the latest block.
    ///
    /// # Errors
    ///
    /// Returns [`parallel_types::ParallelError::RpcError`] when every
    /// endpoint fails.
    pub async fn native_balance(&self, address: &Address) -> Result<TokenBalance> {
        let raw = if self.use_mock {
            MOCK_RBTC_BALANCE
        } else {
            self.rpc.balance(address).await?
        };
        Ok(to_balance(TokenKind::Rbtc, raw))
    }

    /// Governance-token balance via `balanceOf(address)`.
    ///
    /// # Errors
    ///
    /// Returns [`parallel_types::ParallelError::RpcError`] when every
    /// endpoint fails or the contract returns no usable word.
    pub async fn token_balance(&self, address: &Address) -> Result<TokenBalance> {
        let raw = if self.use_mock {
            MOCK_LUT_BALANCE
        } else {
            let data = erc20::encode_balance_of(address);
            let word = self.rpc.call_contract(&self.lut_contract, &data).await?;
            Wei::from_hex_quantity(&word)?
        };
        Ok(to_balance(TokenKind::Lut, raw))
    }

    /// Both balances, fetched concurrently.
    ///
    /// # Errors
    ///
    /// Fails if either read fails; partial results are not surfaced.
    pub async fn all_balances(&self, address: &Address) -> Result<(TokenBalance, TokenBalance)> {
        let (native, token) =
            tokio::join!(self.native_balance(address), self.token_balance(address));
        Ok((native?, token?))
    }
}

fn to_balance(token: TokenKind, raw: Wei) -> TokenBalance {
    TokenBalance {
        token,
        raw,
        formatted: raw.format_units(token.decimals()),
    }
}
