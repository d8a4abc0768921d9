//! Signed variable-length integers: zigzag mapping followed by LEB128, the
//! same bytes Go's `binary.PutVarint` produces.

use crate::error::{ChainError, Result};
use integer_encoding::VarInt;

pub fn encode_varint(value: i64) -> Vec<u8> {
    value.encode_var_vec()
}

/// Decodes one varint from the front of `bytes`, returning the value and the
/// number of bytes consumed.
pub fn decode_varint(bytes: &[u8]) -> Result<(i64, usize)> {
    i64::decode_var(bytes).ok_or_else(|| ChainError::malformed("unterminated varint"))
}
