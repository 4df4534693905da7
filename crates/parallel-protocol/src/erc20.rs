//! Calldata and log-topic encoding for the ERC-20 token contract.

use parallel_types::{Address, Wei};

/// 4-byte selector for `transfer(address,uint256)`.
pub const TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

/// 4-byte selector for `balanceOf(address)`.
pub const BALANCE_OF_SELECTOR: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];

/// Topic 0 of every transfer log: `keccak256("Transfer(address,address,uint256)")`.
pub const TRANSFER_EVENT_TOPIC: &str =
    "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

/// Builds `transfer(to, amount)` calldata: selector plus two 32-byte words.
pub fn encode_transfer(to: &Address, amount: Wei) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + 2 * 32);
    data.extend_from_slice(&TRANSFER_SELECTOR);
    data.extend_from_slice(&address_word(to));
    data.extend_from_slice(&amount_word(amount));
    data
}

/// Builds `balanceOf(owner)` calldata.
pub fn encode_balance_of(owner: &Address) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + 32);
    data.extend_from_slice(&BALANCE_OF_SELECTOR);
    data.extend_from_slice(&address_word(owner));
    data
}

/// Pads an address to the 32-byte hex form `eth_getLogs` topic filters use.
pub fn address_topic(address: &Address) -> String {
    format!(
        "0x000000000000000000000000{}",
        hex::encode(address.as_bytes())
    )
}

fn address_word(address: &Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

fn amount_word(amount: Wei) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&amount.as_u128().to_be_bytes());
    word
}
