//! Fixed-size block records.
//!
//! ```text
//! offset  len   field
//! 0       32    hash
//! 32      32    previous hash
//! 64      8     data length (zigzag varint, zero padded)
//! 72      4008  data (zero padded)
//! 4080    8     block number (i64, big endian)
//! 4088    8     timestamp (i64 ns, big endian)
//! ```
//!
//! 4096 bytes in total so records line up with common I/O block sizes. There
//! is no header or version tag: record `n` starts at byte `n * 4096`.
//!
//! Only the data length is stored as a varint. The block number and timestamp
//! slots hold fixed-width integers: a varint of a present-day nanosecond
//! timestamp takes 9 bytes and an arbitrary `i64` up to 10, neither of which
//! fits 8 bytes. Both slots use the same width so every `i64` block number is
//! storable. The hash still covers the varint forms, see [`crate::block_hash`].

use crate::constants::*;
use crate::error::{ChainError, Result};
use crate::varint::{decode_varint, encode_varint};
use crate::{check_payload, Block, Hash};

const _: () = assert!(TIMESTAMP_OFFSET + INT_SLOT_SIZE == FIXED_BLOCK_SIZE);

pub type Record = [u8; FIXED_BLOCK_SIZE];

pub fn encode(block: &Block) -> Result<Record> {
    check_payload(block.data())?;

    let len_bytes = encode_varint(block.data().len() as i64);
    debug_assert!(len_bytes.len() <= INT_SLOT_SIZE);

    let mut out = [0u8; FIXED_BLOCK_SIZE];
    put(&mut out, HASH_OFFSET, block.hash());
    put(&mut out, PREVIOUS_HASH_OFFSET, block.previous_hash());
    put(&mut out, DATA_LEN_OFFSET, &len_bytes);
    put(&mut out, DATA_OFFSET, block.data());
    put(&mut out, BLOCK_NUMBER_OFFSET, &block.block_number().to_be_bytes());
    put(&mut out, TIMESTAMP_OFFSET, &block.timestamp().to_be_bytes());
    Ok(out)
}

/// Parses one record. The stored hash is returned as-is, not checked.
pub fn decode(record: &[u8]) -> Result<Block> {
    if record.len() != FIXED_BLOCK_SIZE {
        return Err(ChainError::malformed(format!(
            "expected {FIXED_BLOCK_SIZE} bytes, got {}",
            record.len()
        )));
    }

    let hash = read_hash(record, HASH_OFFSET);
    let previous_hash = read_hash(record, PREVIOUS_HASH_OFFSET);
    let data_len = read_data_len(&record[DATA_LEN_OFFSET..DATA_OFFSET])?;
    let data = record[DATA_OFFSET..DATA_OFFSET + data_len].to_vec();
    let block_number = read_i64(record, BLOCK_NUMBER_OFFSET);
    let timestamp = read_i64(record, TIMESTAMP_OFFSET);

    Ok(Block::from_parts(
        hash,
        previous_hash,
        data,
        block_number,
        timestamp,
    ))
}

fn put(out: &mut Record, offset: usize, bytes: &[u8]) {
    out[offset..offset + bytes.len()].copy_from_slice(bytes);
}

fn read_hash(record: &[u8], offset: usize) -> Hash {
    let mut out = [0u8; HASH_SIZE];
    out.copy_from_slice(&record[offset..offset + HASH_SIZE]);
    out
}

fn read_i64(record: &[u8], offset: usize) -> i64 {
    let mut buf = [0u8; INT_SLOT_SIZE];
    buf.copy_from_slice(&record[offset..offset + INT_SLOT_SIZE]);
    i64::from_be_bytes(buf)
}

fn read_data_len(slot: &[u8]) -> Result<usize> {
    let (len, used) = decode_varint(slot)?;
    if slot[used..].iter().any(|b| *b != 0) {
        return Err(ChainError::malformed("trailing bytes in data length slot"));
    }
    if len < 0 || len as u64 > MAX_DATA_SIZE as u64 {
        return Err(ChainError::malformed(format!(
            "data length {len} outside 0..={MAX_DATA_SIZE}"
        )));
    }
    Ok(len as usize)
}
