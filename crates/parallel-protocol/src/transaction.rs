//! Legacy transactions with EIP-155 replay protection.
//!
//! Rootstock accepts only type-0 transactions, so this is the sole shape the
//! wallet produces. Native transfers carry empty `data`; token transfers
//! carry ERC-20 calldata and a zero `value`.

use parallel_crypto::hash::keccak256;
use parallel_crypto::signing::{sign_digest, PrivateKey};
use parallel_types::{Address, Result, Wei};

use crate::rlp;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTransaction {
    pub nonce: u64,
    pub gas_price: Wei,
    pub gas_limit: u64,
    pub to: Address,
    pub value: Wei,
    pub data: Vec<u8>,
    pub chain_id: u64,
}

impl LegacyTransaction {
    /// Returns the EIP-155 signing digest:
    /// `keccak256(rlp([nonce, gasPrice, gasLimit, to, value, data, chainId, 0, 0]))`.
    pub fn sighash(&self) -> [u8; 32] {
        let mut fields = self.common_fields();
        fields.push(rlp::encode_u64(self.chain_id));
        fields.push(rlp::encode_u64(0));
        fields.push(rlp::encode_u64(0));
        keccak256(&rlp::encode_list(&fields))
    }

    /// Signs the transaction and returns the raw bytes as 0x-prefixed hex,
    /// ready for `eth_sendRawTransaction`. The recovery bit folds into
    /// `v = chain_id * 2 + 35 + recovery_id`.
    ///
    /// # Errors
    ///
    /// Returns [`parallel_types::ParallelError::SigningError`] if signing
    /// fails.
    pub fn sign(&self, key: &PrivateKey) -> Result<String> {
        let signature = sign_digest(key, &self.sighash())?;
        let v = self.chain_id * 2 + 35 + u64::from(signature.recovery_id);
        let mut fields = self.common_fields();
        fields.push(rlp::encode_u64(v));
        fields.push(rlp::encode_uint_bytes(&signature.r));
        fields.push(rlp::encode_uint_bytes(&signature.s));
        Ok(format!("0x{}", hex::encode(rlp::encode_list(&fields))))
    }

    fn common_fields(&self) -> Vec<Vec<u8>> {
        vec![
            rlp::encode_u64(self.nonce),
            rlp::encode_u128(self.gas_price.as_u128()),
            rlp::encode_u64(self.gas_limit),
            rlp::encode_bytes(self.to.as_bytes()),
            rlp::encode_u128(self.value.as_u128()),
            rlp::encode_bytes(&self.data),
        ]
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    // The worked example from the EIP-155 specification text.
    fn reference_transaction() -> LegacyTransaction {
        LegacyTransaction {
            nonce: 9,
            gas_price: Wei::new(20_000_000_000),
            gas_limit: 21_000,
            to: Address::from_str("0x3535353535353535353535353535353535353535").unwrap(),
            value: Wei::new(1_000_000_000_000_000_000),
            data: Vec::new(),
            chain_id: 1,
        }
    }

    fn reference_key() -> PrivateKey {
        PrivateKey::from_hex(
            "0x4646464646464646464646464646464646464646464646464646464646464646",
        )
        .unwrap()
    }

    #[test]
    fn sighash_matches_reference() {
        assert_eq!(
            hex::encode(reference_transaction().sighash()),
            "daf5a779ae972f972197303d7b574746c7ef83eabadc4dbeea147d27e814ad6e"
        );
    }

    #[test]
    fn signed_raw_matches_reference() -> parallel_types::Result<()> {
        let raw = reference_transaction().sign(&reference_key())?;
        assert_eq!(
            raw,
            "0xf86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83"
        );
        Ok(())
    }

    #[test]
    fn chain_id_separates_digests() {
        let mainnet = reference_transaction();
        let rootstock = LegacyTransaction {
            chain_id: 30,
            ..mainnet.clone()
        };
        assert_ne!(mainnet.sighash(), rootstock.sighash());
    }

    #[test]
    fn v_carries_the_chain_id() -> parallel_types::Result<()> {
        let tx = LegacyTransaction {
            chain_id: 30,
            ..reference_transaction()
        };
        let signature = sign_digest(&reference_key(), &tx.sighash())?;
        let v = 30 * 2 + 35 + u64::from(signature.recovery_id);
        assert!(v == 95 || v == 96);

        // Empty calldata encodes as 0x80, immediately followed by v.
        let raw = tx.sign(&reference_key())?;
        assert!(raw.contains(&format!("80{v:02x}")));
        Ok(())
    }

    #[test]
    fn calldata_is_carried_verbatim() -> parallel_types::Result<()> {
        let tx = LegacyTransaction {
            data: vec![0xa9, 0x05, 0x9c, 0xbb],
            value: Wei::ZERO,
            ..reference_transaction()
        };
        let raw = tx.sign(&reference_key())?;
        assert!(raw.contains("a9059cbb"));
        Ok(())
    }
}
