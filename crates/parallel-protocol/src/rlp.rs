//! Recursive length prefix encoding.
//!
//! Only the encoder is implemented; the wallet never parses RLP, it only
//! produces signing payloads and raw transactions.

/// Encodes a byte string.
pub fn encode_bytes(bytes: &[u8]) -> Vec<u8> {
    if bytes.len() == 1 && bytes[0] < 0x80 {
        return vec![bytes[0]];
    }
    let mut out = length_prefix(bytes.len(), 0x80);
    out.extend_from_slice(bytes);
    out
}

/// Encodes a list whose items are already RLP-encoded.
pub fn encode_list(items: &[Vec<u8>]) -> Vec<u8> {
    let payload_len: usize = items.iter().map(Vec::len).sum();
    let mut out = length_prefix(payload_len, 0xc0);
    for item in items {
        out.extend_from_slice(item);
    }
    out
}

/// Encodes an unsigned integer as its minimal big-endian byte string. Zero
/// encodes as the empty string.
pub fn encode_u64(value: u64) -> Vec<u8> {
    encode_uint_bytes(&value.to_be_bytes())
}

/// See [`encode_u64`].
pub fn encode_u128(value: u128) -> Vec<u8> {
    encode_uint_bytes(&value.to_be_bytes())
}

/// Strips leading zeros and encodes the rest as a byte string. Used for
/// integers carried as fixed-width buffers, such as signature components.
pub fn encode_uint_bytes(bytes: &[u8]) -> Vec<u8> {
    let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    encode_bytes(&bytes[first..])
}

fn length_prefix(len: usize, offset: u8) -> Vec<u8> {
    if len <= 55 {
        vec![offset + len as u8]
    } else {
        let be = len.to_be_bytes();
        let first = be.iter().position(|&b| b != 0).unwrap_or(be.len() - 1);
        let be = &be[first..];
        let mut out = Vec::with_capacity(1 + be.len());
        out.push(offset + 55 + be.len() as u8);
        out.extend_from_slice(be);
        out
    }
}
