pub mod chain;
pub mod codec;
pub mod constants;
pub mod error;
pub mod varint;

pub use chain::{is_valid, ChainStore, MemoryChain};
pub use constants::{FIXED_BLOCK_SIZE, MAX_DATA_SIZE};
pub use error::{ChainError, Result};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};
use varint::encode_varint;

pub type Hash = [u8; 32];

/// Previous hash of the genesis block. Also what an "empty" hash looks like
/// once written into a fixed record.
pub const ZERO_HASH: Hash = [0u8; 32];

/// Block number handed to the factory when there is no previous block.
pub const GENESIS_PREVIOUS_NUMBER: i64 = -1;

/// SHA-256 over the data, the varint block number and timestamp, then the
/// previous hash unless it is [`ZERO_HASH`]. An all-zero previous hash is
/// treated as absent, so genesis hashes the same before and after a round trip
/// through a fixed record.
///
/// Changing anything here invalidates every block already written.
pub fn block_hash(data: &[u8], block_number: i64, timestamp: i64, previous_hash: &Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.update(encode_varint(block_number));
    hasher.update(encode_varint(timestamp));
    if *previous_hash != ZERO_HASH {
        hasher.update(previous_hash);
    }
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[..]);
    out
}

/// Nanoseconds since the Unix epoch, saturating instead of failing when the
/// clock is before the epoch or too far past it.
pub fn now_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    hash: Hash,
    previous_hash: Hash,
    data: Vec<u8>,
    block_number: i64,
    timestamp: i64,
}

impl Block {
    /// Builds the block that follows `previous_block_number` / `previous_hash`,
    /// stamped with the current wall-clock time.
    pub fn new(data: &[u8], previous_block_number: i64, previous_hash: Hash) -> Result<Self> {
        Self::with_timestamp(data, previous_block_number, previous_hash, now_nanos())
    }

    pub fn genesis(data: &[u8]) -> Result<Self> {
        Self::new(data, GENESIS_PREVIOUS_NUMBER, ZERO_HASH)
    }

    /// Same as [`Block::new`] with an explicit timestamp.
    pub fn with_timestamp(
        data: &[u8],
        previous_block_number: i64,
        previous_hash: Hash,
        timestamp: i64,
    ) -> Result<Self> {
        check_payload(data)?;
        let block_number = previous_block_number
            .checked_add(1)
            .ok_or_else(|| ChainError::malformed("block number overflows i64"))?;
        let hash = block_hash(data, block_number, timestamp, &previous_hash);
        Ok(Self {
            hash,
            previous_hash,
            data: data.to_vec(),
            block_number,
            timestamp,
        })
    }

    /// Assembles a block from stored fields. The hash is taken as given; use
    /// [`Block::verify_block_hash`] to check it.
    pub fn from_parts(
        hash: Hash,
        previous_hash: Hash,
        data: Vec<u8>,
        block_number: i64,
        timestamp: i64,
    ) -> Self {
        Self {
            hash,
            previous_hash,
            data,
            block_number,
            timestamp,
        }
    }

    pub fn hash(&self) -> &Hash {
        &self.hash
    }

    pub fn previous_hash(&self) -> &Hash {
        &self.previous_hash
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn block_number(&self) -> i64 {
        self.block_number
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn is_genesis(&self) -> bool {
        self.block_number == 0
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// Recomputes the digest from the block's fields and compares all 32 bytes.
    pub fn verify_block_hash(&self) -> bool {
        block_hash(&self.data, self.block_number, self.timestamp, &self.previous_hash) == self.hash
    }
}

/// Rejects payloads that do not fit the data region of a record.
pub fn check_payload(data: &[u8]) -> Result<()> {
    if data.len() > MAX_DATA_SIZE {
        return Err(ChainError::PayloadTooLarge {
            len: data.len(),
            max: MAX_DATA_SIZE,
        });
    }
    Ok(())
}
