//! # Canonical Encoding
//!
//! RLP encoding of headers and ledger entries, and the Keccak-256 helpers
//! every hash in the chain is derived from.

use num_bigint::BigUint;
use rlp::{Encodable, RlpStream};
use sha3::{Digest, Keccak256};

use crate::entities::{Hash, Header, ShardState};

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> Hash {
    Keccak256::digest(data).into()
}

/// Hash of an empty uncle list, `keccak256(rlp([]))`.
pub fn empty_uncle_hash() -> Hash {
    keccak256(&[0xc0])
}

/// Hash of the RLP list of `uncles`.
pub fn uncle_hash(uncles: &[Header]) -> Hash {
    let mut stream = RlpStream::new_list(uncles.len());
    for uncle in uncles {
        stream.append(uncle);
    }
    keccak256(&stream.out())
}

/// Append a byte string item.
pub fn append_bytes(stream: &mut RlpStream, bytes: &[u8]) {
    stream.append(&bytes.to_vec());
}

/// Append an unsigned big integer as a minimal big-endian byte string.
///
/// Zero encodes as the empty string, matching RLP integer rules.
pub fn append_biguint(stream: &mut RlpStream, value: &BigUint) {
    if value.bits() == 0 {
        stream.append_empty_data();
    } else {
        stream.append(&value.to_bytes_be());
    }
}

impl Encodable for ShardState {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(3);
        s.append(&self.shard_id);
        s.append(&self.block_number);
        s.append(&self.reward_remains);
    }
}

impl Encodable for Header {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(18);
        append_bytes(s, &self.parent_hash);
        append_bytes(s, &self.uncle_hash);
        append_bytes(s, &self.coinbase);
        append_bytes(s, &self.root);
        append_bytes(s, &self.tx_hash);
        append_bytes(s, &self.receipt_hash);
        append_bytes(s, &self.bloom);
        append_biguint(s, &self.difficulty);
        s.append(&self.number);
        s.append(&self.gas_limit);
        s.append(&self.gas_used);
        s.append(&self.time);
        append_bytes(s, &self.extra);
        append_bytes(s, &self.mix_digest);
        append_bytes(s, &self.nonce);
        s.append(&self.shard_id);
        append_bytes(s, &self.shard_enabled);
        s.begin_list(self.shard_state.len());
        for state in &self.shard_state {
            s.append(state);
        }
    }
}
