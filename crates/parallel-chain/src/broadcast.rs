//! Transaction construction, signing, and one-shot broadcast.
//!
//! Builds the EIP-155 legacy transaction for a send (plain value transfer
//! for the native coin, `transfer(to, amount)` calldata for the token),
//! signs it, and submits the raw bytes. Submission happens exactly once;
//! after a failure the caller re-estimates and resubmits explicitly.

use tracing::info;

use parallel_crypto::PrivateKey;
use parallel_protocol::{erc20, LegacyTransaction};
use parallel_types::{Address, ParallelError, Result, TokenKind, TxHash, Wei};

use crate::fees::{FeeEstimator, FeeRequest};
use crate::rpc::RpcClient;

/// A fully specified send, ready to sign.
#[derive(Clone, Debug)]
pub struct SendRequest {
    pub token: TokenKind,
    pub to: Address,
    /// Exact amount in the smallest unit of `token`.
    pub amount: Wei,
    /// Caller-supplied gas limit; a fresh estimate fills it when absent.
    pub gas_limit: Option<u64>,
    /// Caller-supplied gas price; a fresh estimate fills it when absent.
    pub gas_price: Option<Wei>,
}

/// Signs and submits transactions for one chain.
pub struct Broadcaster<'a> {
    rpc: &'a RpcClient,
    chain_id: u64,
    lut_contract: Address,
}

impl<'a> Broadcaster<'a> {
    pub fn new(rpc: &'a RpcClient, chain_id: u64, lut_contract: Address) -> Self {
        Self {
            rpc,
            chain_id,
            lut_contract,
        }
    }

    /// Signs and submits `request`, returning the node-assigned hash.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::BroadcastError`] when the nonce read or
    /// the submission fails, [`ParallelError::SigningError`] when the key
    /// is unusable, and [`ParallelError::EstimationError`] when gas
    /// parameters were absent and no estimate could be produced.
    pub async fn send_transaction(
        &self,
        key: &PrivateKey,
        request: &SendRequest,
    ) -> Result<TxHash> {
        let from = key.address()?;

        let (gas_limit, gas_price) = match (request.gas_limit, request.gas_price) {
            (Some(limit), Some(price)) => (limit, price),
            _ => {
                let estimate = FeeEstimator::new(self.rpc, self.lut_contract)
                    .estimate(&FeeRequest {
                        token: request.token,
                        from,
                        to: request.to,
                        amount: request.amount,
                    })
                    .await?;
                (
                    request.gas_limit.unwrap_or(estimate.gas_limit),
                    request.gas_price.unwrap_or(estimate.gas_price),
                )
            }
        };

        let nonce =
            self.rpc
                .transaction_count(&from)
                .await
                .map_err(|e| ParallelError::BroadcastError {
                    reason: format!("nonce unavailable: {e}"),
                })?;

        let transaction = self.build_transaction(request, nonce, gas_limit, gas_price);
        let raw = transaction.sign(key)?;

        let hash = self
            .rpc
            .send_raw_transaction(&raw)
            .await
            .map_err(|e| ParallelError::BroadcastError {
                reason: format!("submission rejected: {e}"),
            })?;

        info!(hash = %hash, token = %request.token, nonce, "transaction broadcast");
        Ok(hash)
    }

    fn build_transaction(
        &self,
        request: &SendRequest,
        nonce: u64,
        gas_limit: u64,
        gas_price: Wei,
    ) -> LegacyTransaction {
        match request.token {
            TokenKind::Rbtc => LegacyTransaction {
                nonce,
                gas_price,
                gas_limit,
                to: request.to,
                value: request.amount,
                data: Vec::new(),
                chain_id: self.chain_id,
            },
            TokenKind::Lut => LegacyTransaction {
                nonce,
                gas_price,
                gas_limit,
                to: self.lut_contract,
                value: Wei::ZERO,
                data: erc20::encode_transfer(&request.to, request.amount),
                chain_id: self.chain_id,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use parallel_types::config::{ChainProfile, LUT_CONTRACT};

    use super::*;

    fn recipient() -> Address {
        "0x70997970c51812dc3a010c7d01b50e0d17dc79c8".parse().unwrap()
    }

    fn broadcaster_over(rpc: &RpcClient) -> Broadcaster<'_> {
        Broadcaster::new(rpc, ChainProfile::mainnet().chain_id, LUT_CONTRACT)
    }

    #[test]
    fn native_send_is_a_plain_value_transfer() -> Result<()> {
        let rpc = RpcClient::new(vec!["http://127.0.0.1:1".into()], 1)?;
        let broadcaster = broadcaster_over(&rpc);
        let request = SendRequest {
            token: TokenKind::Rbtc,
            to: recipient(),
            amount: Wei::new(500_000_000_000_000_000),
            gas_limit: Some(23_100),
            gas_price: Some(Wei::new(60_000_000)),
        };

        let tx = broadcaster.build_transaction(&request, 7, 23_100, Wei::new(60_000_000));
        assert_eq!(tx.to, recipient());
        assert_eq!(tx.value, Wei::new(500_000_000_000_000_000));
        assert!(tx.data.is_empty());
        assert_eq!(tx.nonce, 7);
        assert_eq!(tx.chain_id, 30);
        Ok(())
    }

    #[test]
    fn token_send_calls_the_contract_with_zero_value() -> Result<()> {
        let rpc = RpcClient::new(vec!["http://127.0.0.1:1".into()], 1)?;
        let broadcaster = broadcaster_over(&rpc);
        let request = SendRequest {
            token: TokenKind::Lut,
            to: recipient(),
            amount: Wei::new(2_000_000_000_000_000_000_000),
            gas_limit: Some(110_000),
            gas_price: Some(Wei::new(60_000_000)),
        };

        let tx = broadcaster.build_transaction(&request, 0, 110_000, Wei::new(60_000_000));
        assert_eq!(tx.to, LUT_CONTRACT);
        assert_eq!(tx.value, Wei::ZERO);
        assert_eq!(&tx.data[..4], &erc20::TRANSFER_SELECTOR);
        assert_eq!(tx.data.len(), 68);
        // Recipient rides in the calldata, not the envelope.
        assert_eq!(&tx.data[16..36], recipient().as_bytes());
        Ok(())
    }

    #[test]
    fn signed_token_send_is_broadcastable_hex() -> Result<()> {
        let rpc = RpcClient::new(vec!["http://127.0.0.1:1".into()], 1)?;
        let broadcaster = broadcaster_over(&rpc);
        let key = PrivateKey::from_hex(
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        )?;
        let request = SendRequest {
            token: TokenKind::Lut,
            to: recipient(),
            amount: Wei::new(1_000_000_000_000_000_000),
            gas_limit: None,
            gas_price: None,
        };

        let raw = broadcaster
            .build_transaction(&request, 1, 110_000, Wei::new(60_000_000))
            .sign(&key)?;
        assert!(raw.starts_with("0x"));
        assert!(raw.contains("a9059cbb"));
        Ok(())
    }
}
