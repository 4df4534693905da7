//! EIP-712 typed data for governance messages.
//!
//! The governance service verifies vote and proposal signatures against
//! fixed schemas under the domain `{ name: "parallel", version: "1" }`. The
//! domain deliberately omits `chainId` and `verifyingContract`; governance
//! messages are chain-agnostic. Digests follow the standard construction
//! `keccak256(0x1901 || domainSeparator || hashStruct(message))`.

use parallel_crypto::hash::keccak256;
use parallel_crypto::signing::{sign_digest, PrivateKey};
use parallel_types::{Address, Result};

/// Domain name bound into every governance signature.
pub const DOMAIN_NAME: &str = "parallel";

/// Domain version bound into every governance signature.
pub const DOMAIN_VERSION: &str = "1";

const DOMAIN_TYPE: &str = "EIP712Domain(string name,string version)";

const VOTE_TYPE: &str =
    "Vote(string proposalId,address voter,string choice,uint256 snapshotBlock,uint64 timestamp)";

const PROPOSAL_TYPE: &str = "Proposal(address from,string space,uint64 timestamp,string type,\
                             string title,string body,string discussion,string[] choices,\
                             uint64 start,uint64 end,uint64 snapshot,string plugins,string app)";

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// A governance vote, one of the fixed schemas the sequencer accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteMessage {
    pub proposal_id: String,
    pub voter: Address,
    pub choice: String,
    pub snapshot_block: u64,
    pub timestamp: u64,
}

impl VoteMessage {
    /// `hashStruct(vote)` per EIP-712.
    pub fn hash_struct(&self) -> [u8; 32] {
        let mut encoded = Vec::with_capacity(6 * 32);
        encoded.extend_from_slice(&keccak256(VOTE_TYPE.as_bytes()));
        encoded.extend_from_slice(&encode_string(&self.proposal_id));
        encoded.extend_from_slice(&encode_address(&self.voter));
        encoded.extend_from_slice(&encode_string(&self.choice));
        encoded.extend_from_slice(&encode_u64(self.snapshot_block));
        encoded.extend_from_slice(&encode_u64(self.timestamp));
        keccak256(&encoded)
    }

    /// The 32-byte digest the voter signs.
    pub fn signing_digest(&self) -> [u8; 32] {
        typed_digest(self.hash_struct())
    }

    /// Signs the vote and returns the `r || s || v` hex signature with
    /// `v = 27 + recovery_id`.
    ///
    /// # Errors
    ///
    /// Returns [`parallel_types::ParallelError::SigningError`] if signing
    /// fails.
    pub fn sign(&self, key: &PrivateKey) -> Result<String> {
        Ok(sign_digest(key, &self.signing_digest())?.to_rsv_hex())
    }
}

/// A proposal submission. `kind` maps to the schema field named `type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalMessage {
    pub from: Address,
    pub space: String,
    pub timestamp: u64,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub discussion: String,
    pub choices: Vec<String>,
    pub start: u64,
    pub end: u64,
    pub snapshot: u64,
    pub plugins: String,
    pub app: String,
}

impl ProposalMessage {
    /// `hashStruct(proposal)` per EIP-712.
    pub fn hash_struct(&self) -> [u8; 32] {
        let mut encoded = Vec::with_capacity(14 * 32);
        encoded.extend_from_slice(&keccak256(PROPOSAL_TYPE.as_bytes()));
        encoded.extend_from_slice(&encode_address(&self.from));
        encoded.extend_from_slice(&encode_string(&self.space));
        encoded.extend_from_slice(&encode_u64(self.timestamp));
        encoded.extend_from_slice(&encode_string(&self.kind));
        encoded.extend_from_slice(&encode_string(&self.title));
        encoded.extend_from_slice(&encode_string(&self.body));
        encoded.extend_from_slice(&encode_string(&self.discussion));
        encoded.extend_from_slice(&encode_string_array(&self.choices));
        encoded.extend_from_slice(&encode_u64(self.start));
        encoded.extend_from_slice(&encode_u64(self.end));
        encoded.extend_from_slice(&encode_u64(self.snapshot));
        encoded.extend_from_slice(&encode_string(&self.plugins));
        encoded.extend_from_slice(&encode_string(&self.app));
        keccak256(&encoded)
    }

    /// The 32-byte digest the author signs.
    pub fn signing_digest(&self) -> [u8; 32] {
        typed_digest(self.hash_struct())
    }

    /// Signs the proposal, as [`VoteMessage::sign`].
    ///
    /// # Errors
    ///
    /// Returns [`parallel_types::ParallelError::SigningError`] if signing
    /// fails.
    pub fn sign(&self, key: &PrivateKey) -> Result<String> {
        Ok(sign_digest(key, &self.signing_digest())?.to_rsv_hex())
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// `hashStruct(EIP712Domain { name, version })`.
pub fn domain_separator() -> [u8; 32] {
    let mut encoded = Vec::with_capacity(3 * 32);
    encoded.extend_from_slice(&keccak256(DOMAIN_TYPE.as_bytes()));
    encoded.extend_from_slice(&encode_string(DOMAIN_NAME));
    encoded.extend_from_slice(&encode_string(DOMAIN_VERSION));
    keccak256(&encoded)
}

fn typed_digest(struct_hash: [u8; 32]) -> [u8; 32] {
    let mut buffer = Vec::with_capacity(2 + 2 * 32);
    buffer.extend_from_slice(&[0x19, 0x01]);
    buffer.extend_from_slice(&domain_separator());
    buffer.extend_from_slice(&struct_hash);
    keccak256(&buffer)
}

fn encode_string(value: &str) -> [u8; 32] {
    keccak256(value.as_bytes())
}

fn encode_address(value: &Address) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[12..].copy_from_slice(value.as_bytes());
    out
}

fn encode_u64(value: u64) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[24..].copy_from_slice(&value.to_be_bytes());
    out
}

fn encode_string_array(items: &[String]) -> [u8; 32] {
    let mut concat = Vec::with_capacity(items.len() * 32);
    for item in items {
        concat.extend_from_slice(&encode_string(item));
    }
    keccak256(&concat)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use parallel_crypto::signing::{recover_address, RecoverableSignature};

    use super::*;

    fn voter() -> Address {
        Address::from_str("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266").unwrap()
    }

    fn sample_vote() -> VoteMessage {
        VoteMessage {
            proposal_id: "0xabc123".to_string(),
            voter: voter(),
            choice: "FOR".to_string(),
            snapshot_block: 6_400_000,
            timestamp: 1_755_000_000,
        }
    }

    fn sample_proposal() -> ProposalMessage {
        ProposalMessage {
            from: voter(),
            space: "parallel".to_string(),
            timestamp: 1_755_000_000,
            kind: "single-choice".to_string(),
            title: "Fund the treasury".to_string(),
            body: "Allocate funds for Q4.".to_string(),
            discussion: String::new(),
            choices: vec!["FOR".to_string(), "AGAINST".to_string()],
            start: 1_755_000_000,
            end: 1_755_604_800,
            snapshot: 6_400_000,
            plugins: "{}".to_string(),
            app: "parallel".to_string(),
        }
    }

    #[test]
    fn domain_separator_matches_manual_assembly() {
        let mut encoded = Vec::new();
        encoded.extend_from_slice(&keccak256(
            b"EIP712Domain(string name,string version)",
        ));
        encoded.extend_from_slice(&keccak256(b"parallel"));
        encoded.extend_from_slice(&keccak256(b"1"));
        assert_eq!(domain_separator(), keccak256(&encoded));
    }

    #[test]
    fn vote_digest_is_deterministic() {
        assert_eq!(sample_vote().signing_digest(), sample_vote().signing_digest());
    }

    #[test]
    fn every_vote_field_reaches_the_digest() {
        let base = sample_vote().signing_digest();
        let variants = [
            VoteMessage {
                proposal_id: "0xabc124".to_string(),
                ..sample_vote()
            },
            VoteMessage {
                voter: Address::from_str("0x70997970c51812dc3a010c7d01b50e0d17dc79c8").unwrap(),
                ..sample_vote()
            },
            VoteMessage {
                choice: "AGAINST".to_string(),
                ..sample_vote()
            },
            VoteMessage {
                snapshot_block: 6_400_001,
                ..sample_vote()
            },
            VoteMessage {
                timestamp: 1_755_000_001,
                ..sample_vote()
            },
        ];
        for variant in variants {
            assert_ne!(variant.signing_digest(), base);
        }
    }

    #[test]
    fn choice_order_reaches_the_proposal_digest() {
        let base = sample_proposal();
        let flipped = ProposalMessage {
            choices: vec!["AGAINST".to_string(), "FOR".to_string()],
            ..base.clone()
        };
        assert_ne!(flipped.signing_digest(), base.signing_digest());
    }

    #[test]
    fn empty_strings_are_encodable() {
        let proposal = ProposalMessage {
            discussion: String::new(),
            plugins: String::new(),
            ..sample_proposal()
        };
        // Must not panic and must still be domain-bound.
        assert_ne!(proposal.signing_digest(), proposal.hash_struct());
    }

    #[test]
    fn vote_signature_recovers_the_voter() -> parallel_types::Result<()> {
        let key = PrivateKey::from_hex(
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        )?;
        let vote = sample_vote();
        let encoded = vote.sign(&key)?;
        assert_eq!(encoded.len(), 132);

        let raw = hex::decode(encoded.trim_start_matches("0x")).unwrap();
        assert!(raw[64] == 27 || raw[64] == 28);
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&raw[..32]);
        s.copy_from_slice(&raw[32..64]);
        let signature = RecoverableSignature {
            r,
            s,
            recovery_id: raw[64] - 27,
        };
        let recovered = recover_address(&vote.signing_digest(), &signature)?;
        assert_eq!(recovered, vote.voter);
        Ok(())
    }
}
