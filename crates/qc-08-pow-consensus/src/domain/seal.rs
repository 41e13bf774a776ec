//! Seal hashing and proof-of-work acceptance
//!
//! The memory-hard function itself sits behind
//! [`PowDataProvider`](crate::ports::PowDataProvider); this module only
//! defines what is hashed and how its output is judged.

use num_bigint::BigUint;
use num_traits::One;
use rlp::RlpStream;
use shared_types::encoding::{append_biguint, append_bytes};
use shared_types::{keccak256, Hash, Header};

use crate::error::{ConsensusError, ConsensusResult};
use crate::ports::PowOutput;

/// Fields hashed into the seal hash.
const SEAL_FIELDS: usize = 13;

/// Keccak-256 of the header without its nonce and mix digest.
///
/// Master headers commit to the uncle hash; shard headers commit to their
/// shard id instead.
pub fn seal_hash(header: &Header) -> Hash {
    let mut stream = RlpStream::new_list(SEAL_FIELDS);
    if header.is_master() {
        append_bytes(&mut stream, &header.parent_hash);
        append_bytes(&mut stream, &header.uncle_hash);
    } else {
        stream.append(&header.shard_id);
        append_bytes(&mut stream, &header.parent_hash);
    }
    append_bytes(&mut stream, &header.coinbase);
    append_bytes(&mut stream, &header.root);
    append_bytes(&mut stream, &header.tx_hash);
    append_bytes(&mut stream, &header.receipt_hash);
    append_bytes(&mut stream, &header.bloom);
    append_biguint(&mut stream, &header.difficulty);
    stream.append(&header.number);
    stream.append(&header.gas_limit);
    stream.append(&header.gas_used);
    stream.append(&header.time);
    append_bytes(&mut stream, &header.extra);
    keccak256(&stream.out())
}

/// Cache/dataset epoch of block `number`.
pub fn epoch(number: u64, epoch_length: u64) -> u64 {
    number / epoch_length.max(1)
}

/// Largest acceptable PoW result, `2^256 / difficulty`.
///
/// Callers reject zero difficulty before asking.
pub fn pow_target(difficulty: &BigUint) -> BigUint {
    (BigUint::one() << 256usize) / difficulty
}

/// Judge recomputed PoW outputs against the header's declared seal.
pub fn check_pow_output(header: &Header, output: &PowOutput) -> ConsensusResult<()> {
    if output.digest != header.mix_digest {
        return Err(ConsensusError::InvalidMixDigest);
    }
    if header.difficulty.bits() == 0 {
        return Err(ConsensusError::NonPositiveDifficulty);
    }
    if BigUint::from_bytes_be(&output.result) > pow_target(&header.difficulty) {
        return Err(ConsensusError::InvalidPoW);
    }
    Ok(())
}
